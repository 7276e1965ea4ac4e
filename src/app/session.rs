use crate::core::engine::MapEngine;
use crate::domain::model::{InsetPosition, MapParameters};
use crate::domain::ports::{Geocoder, Storage};
use crate::utils::error::MapError;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Country preselected when an interactive session starts without inputs.
pub const DEFAULT_COUNTRY: &str = "Ecuador";

/// Result of the last render, kept so unchanged parameters are not redrawn.
#[derive(Debug, Clone)]
pub enum Outcome {
    Map(PathBuf),
    Failed(Arc<MapError>),
}

/// One user's view: the applied parameters and the last outcome.
pub struct MapSession<G: Geocoder, S: Storage> {
    engine: MapEngine<G, S>,
    params: MapParameters,
    last: Option<(MapParameters, Outcome)>,
}

impl<G: Geocoder, S: Storage> MapSession<G, S> {
    pub fn new(engine: MapEngine<G, S>, params: MapParameters) -> Self {
        Self {
            engine,
            params,
            last: None,
        }
    }

    pub fn params(&self) -> &MapParameters {
        &self.params
    }

    pub fn apply(&mut self, params: MapParameters) {
        self.params = params;
    }

    /// Renders the applied parameters unless they match the previous render.
    pub async fn generate(&mut self) -> Outcome {
        if let Some((params, outcome)) = &self.last {
            if *params == self.params {
                tracing::debug!("Parameters unchanged, reusing last outcome");
                return outcome.clone();
            }
        }

        let outcome = match self.engine.generate(&self.params).await {
            Ok(path) => Outcome::Map(path),
            Err(e) => {
                tracing::error!(
                    "Map generation failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                Outcome::Failed(Arc::new(e))
            }
        };
        self.last = Some((self.params.clone(), outcome.clone()));
        outcome
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> std::io::Result<()> {
        writeln!(output, "Study area map session. Type 'help' for commands.")?;
        let outcome = self.generate().await;
        self.print_outcome(&mut output, &outcome)?;

        let mut lines = input.lines();
        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;

            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => writeln!(output, "{}", HELP)?,
                Ok(Command::Show) => self.print_params(&mut output)?,
                Ok(Command::Generate) => {
                    let outcome = self.generate().await;
                    self.print_outcome(&mut output, &outcome)?;
                }
                Ok(Command::Countries(filter)) => {
                    let names = self.engine.resolver().dataset().country_names();
                    let filter = filter.map(|f| f.to_lowercase());
                    for name in names.iter().filter(|name| {
                        filter
                            .as_deref()
                            .map_or(true, |f| name.to_lowercase().contains(f))
                    }) {
                        writeln!(output, "{}", name)?;
                    }
                }
                Ok(Command::Set(edit)) => {
                    let mut params = self.params.clone();
                    edit.apply_to(&mut params);
                    self.apply(params);
                }
                Ok(Command::Empty) => {}
                Err(message) => writeln!(output, "{}", message)?,
            }
        }
        Ok(())
    }

    fn print_params<W: Write>(&self, output: &mut W) -> std::io::Result<()> {
        let params = &self.params;
        writeln!(output, "country: {}", params.country.as_deref().unwrap_or("-"))?;
        writeln!(output, "place:   {}", params.place.as_deref().unwrap_or("-"))?;
        writeln!(output, "inset:   {}", params.inset)?;
        writeln!(output, "title:   {}", params.title)
    }

    fn print_outcome<W: Write>(&self, output: &mut W, outcome: &Outcome) -> std::io::Result<()> {
        match outcome {
            Outcome::Map(path) => writeln!(output, "Map saved to: {}", path.display()),
            Outcome::Failed(e) => {
                writeln!(output, "❌ {}", e.user_friendly_message())?;
                writeln!(output, "💡 {}", e.recovery_suggestion())
            }
        }
    }
}

const HELP: &str = "\
Commands:
  countries [filter]   list country names
  country <name>       select a country
  place <text>         search a city or place (overrides the country)
  clear place          forget the place search
  inset <position>     'upper right' or 'bottom right'
  title <text>         set the map title
  show                 print the current parameters
  generate             render the map
  help                 show this text
  quit                 leave";

/// A parameter change typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Country(String),
    Place(String),
    ClearPlace,
    Inset(InsetPosition),
    Title(String),
}

impl Edit {
    fn apply_to(self, params: &mut MapParameters) {
        match self {
            Edit::Country(name) => params.country = Some(name),
            Edit::Place(text) => params.place = Some(text),
            Edit::ClearPlace => params.place = None,
            Edit::Inset(position) => params.inset = position,
            Edit::Title(title) => params.title = title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Countries(Option<String>),
    Set(Edit),
    Show,
    Generate,
    Help,
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word.to_lowercase().as_str(), rest) {
            ("", _) => Command::Empty,
            ("countries", "") => Command::Countries(None),
            ("countries", filter) => Command::Countries(Some(filter.to_string())),
            ("country", "") => return Err("Usage: country <name>".to_string()),
            ("country", name) => Command::Set(Edit::Country(name.to_string())),
            ("place", "") => return Err("Usage: place <text>".to_string()),
            ("place", text) => Command::Set(Edit::Place(text.to_string())),
            ("clear", "place") => Command::Set(Edit::ClearPlace),
            ("inset", position) => {
                let position = position
                    .parse::<InsetPosition>()
                    .map_err(|_| "Inset must be 'upper right' or 'bottom right'".to_string())?;
                Command::Set(Edit::Inset(position))
            }
            ("title", title) => Command::Set(Edit::Title(title.to_string())),
            ("show", "") => Command::Show,
            ("generate", "") => Command::Generate,
            ("help", _) => Command::Help,
            ("quit", "") | ("exit", "") => Command::Quit,
            _ => return Err(format!("Unknown command '{}'. Type 'help'.", line)),
        };
        Ok(command)
    }
}
