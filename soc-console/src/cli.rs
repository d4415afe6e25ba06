use clap::{Args, Parser, Subcommand};
use soc_client::{Keyword, Page, QueryFilter, RecordQuery, TimeRange};
use soc_vocab::Severity;

#[derive(Parser)]
#[command(
    name = "soc",
    about = "Security operations console: alert and incident queues, Security Agent chat",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work the alert queue
    Alerts {
        #[command(subcommand)]
        command: AlertCommands,
    },

    /// Work the incident queue
    Incidents {
        #[command(subcommand)]
        command: IncidentCommands,
    },

    /// Ask the Security Agent; events are printed one JSON line each
    Chat {
        message: String,

        /// Alert the question is about
        #[arg(long)]
        alert_id: Option<String>,

        /// Wait for one complete answer instead of streaming
        #[arg(long)]
        blocking: bool,
    },

    /// Show how a timestamp is read and sent to the backend
    Time { value: String },

    /// Time to resolve for a record
    Ttr {
        create: String,

        #[arg(long)]
        close: Option<String>,

        /// Record status, e.g. Closed
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AlertCommands {
    List(ListArgs),

    Show {
        id: String,

        #[arg(long)]
        workspace: Option<String>,
    },

    Close {
        id: String,

        /// falsePositive, resolved, repeated, other, or free text
        #[arg(long, default_value = "other")]
        category: String,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        workspace: Option<String>,
    },

    Open {
        id: String,

        #[arg(long)]
        workspace: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum IncidentCommands {
    List(ListArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// `FIELD=VALUE` (title, id, creator, actor) or plain title text; repeatable, ANDed
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// open, block, closed or all
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub severity: Option<String>,

    #[arg(long)]
    pub verification: Option<String>,

    #[arg(long)]
    pub auto_close: Option<String>,

    #[arg(long)]
    pub risk_mode: Option<String>,

    #[arg(long)]
    pub workspace: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 10)]
    pub page_size: u32,

    /// Range start; only sent together with --end
    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub end: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn to_query(&self) -> RecordQuery {
        let keywords: Vec<Keyword> = self
            .keywords
            .iter()
            .map(|k| Keyword::parse(k))
            .filter(|k| !k.value().is_empty())
            .collect();

        let severity = self.severity.as_deref().map(|s| {
            Severity::from_label(s)
                .map(|level| level.as_client().to_string())
                .unwrap_or_else(|| s.to_string())
        });

        let range = (self.start.is_some() || self.end.is_some())
            .then(|| TimeRange::new(self.start.clone(), self.end.clone()));

        RecordQuery {
            filter: QueryFilter {
                keywords,
                status: self.status.clone(),
                severity,
                verification_state: self.verification.clone(),
                auto_close: self.auto_close.clone(),
            },
            page: Page::new(self.page, self.page_size),
            range,
            risk_mode: self.risk_mode.clone(),
            workspace: self.workspace.clone(),
        }
    }
}
