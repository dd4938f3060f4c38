use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use doctrans_core::translate::{GoogleTranslator, Translator};
use doctrans_core::{Config, DOWNLOAD_FILE_NAME, DocumentFormat, Session, UploadedFile};
use doctrans_ingest::{Ingestor, Pipeline, SessionError};

mod output;

use output::ColorMode;

/// Document translator - Extract text from PDF or DOCX files and translate it to Telugu
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the text extracted from a PDF or DOCX file
    Extract {
        /// Path to the PDF or DOCX file
        file_path: PathBuf,

        /// Write the text to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a PDF or DOCX file's text and save its Telugu translation
    Translate {
        /// Path to the PDF or DOCX file
        file_path: PathBuf,

        /// Write the translation to this file, or to translated_text.txt
        /// inside this directory, instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translation service endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let color = ColorMode(!cli.no_color);

    match cli.command {
        Command::Extract { file_path, output } => extract(config, file_path, output, color).await,
        Command::Translate {
            file_path,
            output,
            endpoint,
        } => translate(config, file_path, output, endpoint, color).await,
    }
}

async fn extract(
    config: Config,
    file_path: PathBuf,
    output: Option<PathBuf>,
    color: ColorMode,
) -> anyhow::Result<()> {
    let upload = read_upload(&file_path)?;
    let file_name = upload.file_name.clone();
    let pipeline = build_pipeline(&config)?;

    let mut session = Session::new();
    run_step(pipeline.upload(&mut session, upload).await, color)?;

    let text = session.extracted_text().cloned().unwrap_or_default();
    let mut stderr = std::io::stderr();
    output::print_extraction_summary(&mut stderr, &file_name, &text, color)?;

    match output {
        Some(path) => std::fs::write(&path, text.as_str())?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text.as_str())?;
        }
    }
    Ok(())
}

async fn translate(
    mut config: Config,
    file_path: PathBuf,
    output: Option<PathBuf>,
    endpoint: Option<String>,
    color: ColorMode,
) -> anyhow::Result<()> {
    // Resolve configuration: CLI flags > env vars > config file > defaults
    if let Some(endpoint) = endpoint {
        config.translate_endpoint = endpoint;
    }

    let upload = read_upload(&file_path)?;
    let file_name = upload.file_name.clone();
    let pipeline = build_pipeline(&config)?;
    let mut stderr = std::io::stderr();

    let mut session = Session::new();
    run_step(pipeline.upload(&mut session, upload).await, color)?;
    if let Some(text) = session.extracted_text() {
        output::print_extraction_summary(&mut stderr, &file_name, text, color)?;
    }

    run_step(pipeline.translate(&mut session).await, color)?;

    let Some(artifact) = pipeline.download(&session) else {
        anyhow::bail!("no translation to save");
    };

    match output {
        Some(out) => {
            let path = resolve_output_path(&out);
            std::fs::write(&path, &artifact.bytes)?;
            if let Some(translated) = session.translated_text() {
                output::print_saved(&mut stderr, &path, translated, color)?;
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&artifact.bytes)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("doctrans/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let google = GoogleTranslator::new(client, config);
    tracing::debug!(service = google.name(), endpoint = google.endpoint(), "translator ready");
    let translator: Arc<dyn Translator> = Arc::new(google);

    Ok(Pipeline::new(Ingestor::new(config.temp_dir.clone()), translator))
}

/// Read a file from disk as an upload, declaring the type its extension
/// implies.
fn read_upload(file_path: &Path) -> anyhow::Result<UploadedFile> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());
    let declared_type = DocumentFormat::from_path(file_path).map(|f| f.mime().to_string());
    let data = std::fs::read(file_path)?;

    Ok(UploadedFile {
        file_name,
        declared_type,
        data,
    })
}

/// Report a failed pipeline step and turn it into the process error.
fn run_step(result: Result<(), SessionError>, color: ColorMode) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(SessionError::Pipeline(e)) => {
            output::print_failure(&mut std::io::stderr(), &e, color)?;
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Where the translation is written. A directory gets the standard
/// download file name inside it.
fn resolve_output_path(output: &Path) -> PathBuf {
    if output.is_dir() {
        output.join(DOWNLOAD_FILE_NAME)
    } else {
        output.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_directory_gets_download_name() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_output_path(dir.path()),
            dir.path().join("translated_text.txt")
        );
    }

    #[test]
    fn output_file_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("telugu.txt");
        assert_eq!(resolve_output_path(&file), file);
    }

    #[test]
    fn upload_declares_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let upload = read_upload(&path).unwrap();
        assert_eq!(upload.file_name, "Report.PDF");
        assert_eq!(upload.declared_type.as_deref(), Some("application/pdf"));
        assert_eq!(upload.data, b"%PDF-1.4");
    }

    #[test]
    fn upload_with_unknown_extension_has_no_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        assert_eq!(read_upload(&path).unwrap().declared_type, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_upload(Path::new("/nonexistent/file.pdf")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn cli_parses_translate_flags() {
        let cli = Cli::try_parse_from([
            "doctrans",
            "translate",
            "doc.docx",
            "-o",
            "out",
            "--endpoint",
            "http://localhost:9000/t",
        ])
        .unwrap();
        match cli.command {
            Command::Translate {
                file_path,
                output,
                endpoint,
            } => {
                assert_eq!(file_path, PathBuf::from("doc.docx"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9000/t"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
