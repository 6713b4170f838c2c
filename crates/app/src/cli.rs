use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "guide")]
#[command(about = "Author, check, and track a practice-guide content directory")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Content directory holding content.json, registry.json and articles/
    #[arg(long, value_name = "DIR", env = "GUIDE_CONTENT_DIR", global = true)]
    pub content_dir: Option<PathBuf>,

    /// SQLite URL or path for quiz attempt tracking
    #[arg(long = "db", value_name = "URL", env = "GUIDE_DB_URL", global = true)]
    pub db_url: Option<String>,

    /// Config file (defaults to ./guide.toml when present)
    #[arg(short, long, value_name = "FILE", env = "GUIDE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty content directory
    Init,

    /// Add an article to a topic with a rendering stub and registry entry
    Scaffold {
        topic: String,
        article: String,
        /// Display name shown in the guide
        name: String,
    },

    /// Check catalog, registry and stubs for consistency
    Validate {
        /// Category to require registry entries for (repeatable)
        #[arg(long = "category", value_name = "ID")]
        categories: Vec<String>,

        /// Point total assumed for quizzes that declare none
        #[arg(long, value_name = "POINTS")]
        default_total_points: Option<u32>,
    },

    /// Show the labeled sections of an explanation annotation
    Explain {
        /// Annotation text; read from stdin when omitted
        text: Option<String>,

        /// Explain every quiz question of this article instead
        #[arg(long, value_name = "ID", conflicts_with = "text")]
        article: Option<String>,
    },

    /// Grade and record a quiz attempt
    Submit {
        article: String,

        /// JSON file with a list of {"questionId", "answer"} objects
        #[arg(long, value_name = "FILE")]
        answers: PathBuf,
    },

    /// Print article, topic and category proficiency
    Progress {
        #[arg(long)]
        json: bool,
    },

    /// Forget all recorded attempts for an article
    Reset { article: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_repeated_categories() {
        let cli = Cli::parse_from([
            "guide",
            "validate",
            "--category",
            "backend",
            "--category",
            "frontend",
            "--default-total-points",
            "30",
        ]);
        match cli.command {
            Command::Validate {
                categories,
                default_total_points,
            } => {
                assert_eq!(categories, ["backend", "frontend"]);
                assert_eq!(default_total_points, Some(30));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["guide", "progress", "--json", "--content-dir", "guide", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.content_dir, Some(PathBuf::from("guide")));
        assert!(matches!(cli.command, Command::Progress { json: true }));
    }

    #[test]
    fn explain_text_and_article_conflict() {
        assert!(Cli::try_parse_from(["guide", "explain", "Headline: x", "--article", "a"]).is_err());
    }
}
