use clap::Parser;
use heldenbogen::core::engine::SheetSource;
use heldenbogen::domain::model::{Attribute, SheetKey, Skill};
use heldenbogen::utils::{logger, validation::Validate};
use heldenbogen::{
    AppConfig, CharacterSheet, CliConfig, Command, FormState, LocalStorage, SheetEngine,
    SheetError, ValidationReport,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let mut config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    if config.json_logging() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting heldenbogen");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // Command line overrides
    if let Some(output_dir) = &cli.output_dir {
        config.output.directory = output_dir.clone();
    }
    if let Command::Export {
        formats, bundle, ..
    } = &cli.command
    {
        if !formats.is_empty() {
            config.output.formats = formats.clone();
        }
        if *bundle {
            config.output.bundle = true;
        }
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let engine = SheetEngine::new(LocalStorage::default(), config);

    if let Err(e) = run(&engine, cli.command).await {
        tracing::error!("❌ Command failed: {} (Category: {:?})", e, e.category());
        fail(&e);
    }
}

async fn run(
    engine: &SheetEngine<LocalStorage, AppConfig>,
    command: Command,
) -> heldenbogen::Result<()> {
    match command {
        Command::Template { out } => {
            let form = FormState::template();
            match out {
                Some(path) => {
                    engine.write_draft(&path, &form).await?;
                    println!("📝 Entwurf gespeichert: {}", path);
                }
                None => print!("{}", form.to_toml_string()?),
            }
        }
        Command::Check { sheet } => {
            let sheet = engine.load(&sheet).await?;
            print_summary(&sheet);
            print_report(&engine.check(&sheet));
        }
        Command::Export { sheet, .. } => {
            let sheet = engine.load(&sheet).await?;
            print_report(&engine.check(&sheet));

            let written = engine.export(&sheet).await?;
            for path in &written {
                tracing::info!("📁 Output saved to: {}", path);
                println!("📥 {}", path);
            }
        }
        Command::Import { csv, out } => {
            if SheetSource::from_path(&csv)? != SheetSource::Csv {
                return Err(SheetError::UnsupportedFormat { path: csv });
            }
            let sheet = engine.load(&csv).await?;
            println!("✅ Charakter {} wurde erfolgreich aus der CSV geladen!", sheet.name);
            print_report(&engine.check(&sheet));

            if let Some(path) = out {
                engine.write_draft(&path, &FormState::from_sheet(&sheet)).await?;
                println!("📝 Entwurf gespeichert: {}", path);
            }
        }
    }
    Ok(())
}

fn print_summary(sheet: &CharacterSheet) {
    println!("{} - {}", sheet.name, sheet.hero_class);
    println!("Alter: {}, Glückspunkte: {}", sheet.age, sheet.luck_points);

    let attributes: Vec<String> = Attribute::ALL
        .iter()
        .map(|&attribute| format!("{} {}", attribute.label(), sheet.attributes[attribute]))
        .collect();
    println!(
        "Attribute: {} (Summe {})",
        attributes.join(", "),
        sheet.attributes.total()
    );

    let skills: Vec<String> = Skill::ALL
        .iter()
        .filter(|&&skill| sheet.skills[skill] != 0)
        .map(|&skill| {
            let marker = if sheet.hero_class.is_core_skill(skill) { "*" } else { "" };
            format!("{}{} {}", skill.label(), marker, sheet.skills[skill])
        })
        .collect();
    println!(
        "Fähigkeiten: {} (Summe {})",
        if skills.is_empty() { "-".to_string() } else { skills.join(", ") },
        sheet.skills.total()
    );
}

fn print_report(report: &ValidationReport) {
    if report.is_clean() {
        println!("✅ Keine Warnungen");
        return;
    }
    for warning in report.iter() {
        println!("⚠️ {}", warning);
    }
}

fn fail(e: &SheetError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    eprintln!("💡 Tipp: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
