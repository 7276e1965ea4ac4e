use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use study_area_map::app::{MapSession, DEFAULT_COUNTRY};
use study_area_map::core::ConfigProvider;
use study_area_map::render::font::load_font;
use study_area_map::utils::error::{ErrorSeverity, MapError};
use study_area_map::utils::{logger, validation::Validate};
use study_area_map::{
    BoundaryDataset, CliConfig, CoastlineLayer, GeometryResolver, HttpTileSource, LocalStorage,
    MapEngine, MapRenderer, NominatimGeocoder,
};

fn report_failure(e: &MapError) -> i32 {
    tracing::error!(
        "❌ Map generation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting study-area-map");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_map_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let dataset = Arc::new(
        BoundaryDataset::from_file(config.dataset_path(), &config.field_names()).with_context(
            || format!("loading boundary dataset {}", config.dataset_path().display()),
        )?,
    );

    if cli.list_countries {
        for name in dataset.country_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let geocoder = NominatimGeocoder::new(
        config.geocoder_endpoint(),
        config.user_agent(),
        config.request_timeout(),
    )
    .context("building geocoder client")?;

    let mut renderer = MapRenderer::new(dataset.clone())
        .with_font(load_font(config.render.font_path.as_deref()));
    if config.tiles_enabled() {
        let tiles = HttpTileSource::new(
            config.tile_url_template(),
            config.user_agent(),
            config.request_timeout(),
        )
        .context("building tile client")?;
        renderer = renderer.with_tiles(Box::new(tiles), config.max_tiles());
    } else {
        tracing::info!("Basemap tiles disabled");
    }
    if let Some(path) = &config.dataset.coastline_path {
        let coastlines = CoastlineLayer::from_file(path)
            .with_context(|| format!("loading coastlines {}", path.display()))?;
        renderer = renderer.with_coastlines(Arc::new(coastlines));
    }

    let engine = MapEngine::new_with_monitoring(
        GeometryResolver::new(dataset, geocoder),
        renderer,
        LocalStorage::new(config.output_dir()),
        config.artifact_name(cli.session.as_deref()),
        cli.monitor,
    );

    let mut params = cli.map_parameters();

    if cli.interactive {
        if params.country.is_none() && params.place.is_none() {
            params.country = Some(DEFAULT_COUNTRY.to_string());
        }
        let mut session = MapSession::new(engine, params);
        let stdin = std::io::stdin();
        session
            .run(stdin.lock(), std::io::stdout())
            .await
            .context("interactive session")?;
        return Ok(());
    }

    match engine.generate(&params).await {
        Ok(path) => {
            tracing::info!("✅ Map generated successfully!");
            println!("{}", path.display());
        }
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
