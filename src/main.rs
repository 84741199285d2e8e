use anyhow::Result;
use clap::Parser;
use mechanic_shop::domain::ports::ConfigProvider;
use mechanic_shop::utils::{logger, validation::Validate};
use mechanic_shop::{CliConfig, Shop, ShopError, ShopSettings, SqliteStore, TerminalConsole, TomlConfig};

fn fail(e: &ShopError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code().max(1));
}

fn main() -> Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::info!("🚀 Starting mechanic-shop");

    // 載入 TOML 配置 (可選)
    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    if let Some(config) = &file_config {
        if let Err(e) = config.validate() {
            fail(&e);
        }
    }

    let mut layers: Vec<&dyn ConfigProvider> = vec![&cli];
    if let Some(config) = &file_config {
        layers.push(config);
    }
    let settings = ShopSettings::resolve(&layers);
    if let Err(e) = settings.validate() {
        fail(&e);
    }
    tracing::debug!("Resolved settings: {:?}", settings);

    println!("Connecting to database {}...", settings.database_path);
    let store = match SqliteStore::open(&settings.database_path, &settings.store_options()) {
        Ok(store) => store,
        Err(e) => fail(&e),
    };
    println!("Done");

    let stdin = std::io::stdin();
    let console = TerminalConsole::new(stdin.lock(), std::io::stdout(), settings.output_format);
    let mut shop = Shop::new(store, console);
    let outcome = shop.run();

    // 不論結果如何都先關閉連線
    let (store, _) = shop.into_parts();
    print!("Disconnecting from database...");
    if let Err(e) = store.close() {
        tracing::warn!("⚠️ Error while closing database: {}", e);
    }
    println!("Done\n\nBye !");

    if let Err(e) = outcome {
        fail(&e);
    }

    Ok(())
}
