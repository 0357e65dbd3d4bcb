use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use histodiag::{
    CascadeClassifier, CaseRecordStore, ClassificationRequest, ClassificationType, ModelSet,
    PatientForm, ReportGenerator, Settings, Sex, WorkflowController,
};

#[derive(Parser)]
#[command(name = "histodiag")]
#[command(about = "Classify breast histopathology images and produce diagnosis reports")]
struct Cli {
    /// YAML settings file (defaults apply when omitted)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify an image, store the case and write a report
    Diagnose {
        /// Path to the histopathology image (png, jpg, jpeg)
        #[arg(value_name = "IMAGE")]
        image_path: Option<PathBuf>,

        /// Patient name
        #[arg(long, default_value = "")]
        name: String,

        /// Patient age
        #[arg(long, default_value = "")]
        age: String,

        /// Patient sex: male, female or other
        #[arg(long)]
        sex: Option<Sex>,

        /// "type" (benign/malignant + subtype) or "grade"
        #[arg(long, default_value = "type")]
        classification: ClassificationType,
    },

    /// List every stored case record
    Records,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    log::debug!("Settings: {:?}", settings);

    match args.command {
        Command::Diagnose {
            image_path,
            name,
            age,
            sex,
            classification,
        } => {
            let models = ModelSet::load(&settings.models, settings.input)
                .context("Failed to load classifiers")?;
            let controller = WorkflowController::new(
                CascadeClassifier::new(models),
                CaseRecordStore::new(&settings.records_path),
                ReportGenerator::new(&settings.reports_dir, settings.report_format),
                settings.input,
            );

            let form = PatientForm { name, age, sex };
            let request = ClassificationRequest {
                kind: classification,
                image: image_path,
            };
            let diagnosis = controller.run(&form, &request)?;

            println!("\n=== {} ===", classification);
            println!("Diagnosis: {}", diagnosis.result.primary());
            if let Some(subtype) = diagnosis.result.subtype() {
                println!("Subtype: {}", subtype);
            }
            println!("Report: {}", diagnosis.report.path.display());
        }
        Command::Records => {
            let store = CaseRecordStore::new(&settings.records_path);
            let records = store.load_all()?;

            println!("\n=== Case Records ({}) ===", records.len());
            if records.is_empty() {
                println!("No cases stored in {}", store.path().display());
            }
            for (i, record) in records.iter().enumerate() {
                let subtype = record.subtype.map(|s| s.to_string()).unwrap_or_default();
                println!(
                    "  {}. {} | {} | {} | {} | {} | {} | {}",
                    i + 1,
                    record.patient.name(),
                    record.patient.age(),
                    record.patient.sex(),
                    record.kind,
                    record.result,
                    subtype,
                    histodiag::models::format_timestamp(record.timestamp)?
                );
            }
        }
    }

    Ok(())
}
