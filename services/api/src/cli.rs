use crate::commands::{
    inspect_template, run_i9_fields, run_i9_fill, run_w4_fields, run_w4_fill, FieldsArgs,
    FillArgs, InspectArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hotel_onboard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Hotel Onboarding Forms",
    about = "Serve and generate onboarding PDFs (I-9, W-4) for hotel HR",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Fill or preview the Form I-9 (Section 1)
    I9 {
        #[command(subcommand)]
        command: FormCommand,
    },
    /// Fill or preview the Form W-4
    W4 {
        #[command(subcommand)]
        command: FormCommand,
    },
    /// Work with blank PDF templates
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
}

#[derive(Subcommand, Debug)]
enum FormCommand {
    /// Write a filled PDF from a JSON record
    Fill(FillArgs),
    /// Print the field assignments a JSON record maps to
    Fields(FieldsArgs),
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// List the fillable field names of a template
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::I9 {
            command: FormCommand::Fill(args),
        } => run_i9_fill(args),
        Command::I9 {
            command: FormCommand::Fields(args),
        } => run_i9_fields(args),
        Command::W4 {
            command: FormCommand::Fill(args),
        } => run_w4_fill(args),
        Command::W4 {
            command: FormCommand::Fields(args),
        } => run_w4_fields(args),
        Command::Template {
            command: TemplateCommand::Inspect(args),
        } => inspect_template(args),
    }
}
