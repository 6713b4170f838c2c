use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use guide_core::model::{ArticleId, SubmittedAnswer};
use services::{
    AppServices, Clock, ContentValidator, ExplanationView, ProficiencyReport, ScaffoldRequest,
    ScaffoldService, explain_article,
};
use storage::content::ContentStore;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

use cli::{Cli, Command};
use config::{FileConfig, Settings};

/// Exit status for content that failed validation.
const EXIT_INVALID: u8 = 1;
/// Exit status for runtime failures.
const EXIT_ERROR: u8 = 2;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:"
        || trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure a file-backed database exists so sqlx can open it.
fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to create database {}", path.display()))?;
    }
    Ok(())
}

async fn open_services(settings: &Settings) -> Result<AppServices> {
    let db_url = normalize_sqlite_url(&settings.db_url);
    prepare_sqlite_file(&db_url)?;
    AppServices::new_sqlite(&settings.content_dir, &db_url, Clock::system())
        .await
        .with_context(|| {
            format!(
                "Failed to open content at {} with database {db_url}",
                settings.content_dir.display()
            )
        })
}

fn article_id(raw: &str) -> Result<ArticleId> {
    ArticleId::new(raw).with_context(|| format!("invalid article id {raw:?}"))
}

fn print_explanation(view: &ExplanationView) {
    match view {
        ExplanationView::Empty => println!("(no explanation)"),
        other => println!("{}", other.render_text()),
    }
}

fn print_report(report: &ProficiencyReport) {
    for category in &report.categories {
        println!("{} [{}] {}", category.name, category.id, category.proficiency);
        for topic in &category.topics {
            println!("  {} [{}] {}", topic.name, topic.id, topic.proficiency);
            for article in &topic.articles {
                println!(
                    "    {} [{}] {} ({})",
                    article.name,
                    article.id,
                    article.proficiency,
                    article.learning_status.as_str()
                );
            }
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(file, cli.content_dir, cli.db_url);
    let store = ContentStore::new(&settings.content_dir);

    match cli.command {
        Command::Init => {
            store.init().context("Failed to initialize content directory")?;
            println!("initialized {}", store.root().display());
        }
        Command::Scaffold {
            topic,
            article,
            name,
        } => {
            let request = ScaffoldRequest::parse(&topic, &article, &name)?;
            let outcome = ScaffoldService::new(store).scaffold_article(request)?;
            println!(
                "created {} in {} at {} ({} registry entries)",
                outcome.article_id,
                outcome.topic_id,
                outcome.stub_path.display(),
                outcome.registry_entries
            );
        }
        Command::Validate {
            categories,
            default_total_points,
        } => {
            let config = settings.validation_config(categories, default_total_points)?;
            let report = ContentValidator::new(store, config).run()?;
            for issue in &report.issues {
                println!("{issue}");
            }
            println!(
                "checked {} articles, {} issues",
                report.checked_articles,
                report.issues.len()
            );
            if !report.is_clean() {
                return Ok(ExitCode::from(EXIT_INVALID));
            }
        }
        Command::Explain { text, article } => match article {
            Some(raw) => {
                let catalog = store.load_catalog()?;
                let id = article_id(&raw)?;
                let views = explain_article(&catalog, &id)
                    .ok_or_else(|| anyhow!("article {id} does not exist"))?;
                if views.is_empty() {
                    println!("article {id} has no quiz");
                }
                for (question, view) in &views {
                    println!("[{question}]");
                    print_explanation(view);
                    println!();
                }
            }
            None => {
                let text = match text {
                    Some(text) => text,
                    None => {
                        let mut buf = String::new();
                        std::io::stdin()
                            .read_to_string(&mut buf)
                            .context("Failed to read annotation from stdin")?;
                        buf
                    }
                };
                print_explanation(&ExplanationView::from_annotation(Some(&text)));
            }
        },
        Command::Submit { article, answers } => {
            let id = article_id(&article)?;
            let raw = std::fs::read_to_string(&answers)
                .with_context(|| format!("Failed to read answers from {}", answers.display()))?;
            let answers: Vec<SubmittedAnswer> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse answers in {}", answers.display()))?;
            let app = open_services(&settings).await?;
            let submission = app.progress().submit_quiz(&id, &answers).await?;
            for result in submission.graded.results() {
                let mark = if result.correct { "ok" } else { "--" };
                println!(
                    "{mark} {} {}/{}",
                    result.question_id, result.points_earned, result.points_possible
                );
            }
            println!(
                "attempt {}: {}/{} ({}%), best {}",
                submission.attempt_id,
                submission.graded.earned(),
                submission.graded.possible(),
                submission.graded.percent(),
                submission.proficiency
            );
        }
        Command::Progress { json } => {
            let app = open_services(&settings).await?;
            let report = app.progress().report().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Reset { article } => {
            let id = article_id(&article)?;
            let app = open_services(&settings).await?;
            let removed = app.progress().reset_article(&id).await?;
            println!("removed {removed} attempts for {id}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_are_normalized_to_absolute_paths() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/guide.sqlite3"),
            "sqlite:///tmp/guide.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/guide.sqlite3"),
            "sqlite:///var/guide.sqlite3"
        );
        let relative = normalize_sqlite_url("guide.sqlite3");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("/guide.sqlite3"));
    }

    #[test]
    fn prepare_creates_missing_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("guide.sqlite3");
        let url = format!("sqlite://{}", path.display());
        prepare_sqlite_file(&url).unwrap();
        assert!(path.is_file());
        prepare_sqlite_file("sqlite::memory:").unwrap();
    }
}
