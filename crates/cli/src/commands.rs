use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Execute the statements of a source file against the server
    Run {
        #[arg(
            long,
            help = "File with SQL statements to run; each ends with ';' and must be unique"
        )]
        source: String,

        #[arg(
            long,
            default_value = "statements-completed.txt",
            help = "File that records completed statements so a rerun skips them"
        )]
        progress_file: String,

        #[arg(long, default_value = "http://localhost:9047", help = "REST API URL")]
        url: String,

        #[arg(long, help = "User to use for operations")]
        user: String,

        #[arg(long, help = "Password for --user")]
        password: String,

        #[arg(
            long,
            default_value_t = 1,
            help = "Number of statements to execute at once, by default 1 is recommended"
        )]
        threads: usize,

        #[arg(long, default_value_t = 60, help = "Per-request timeout in seconds")]
        request_timeout_secs: u64,

        #[arg(
            long,
            default_value_t = 1000,
            help = "Milliseconds to wait after each successful statement before recording it"
        )]
        sleep_ms: u64,

        #[arg(long, help = "Skip TLS certificate verification")]
        insecure: bool,
    },
    Progress {
        #[arg(long, help = "File with the SQL statements of the batch")]
        source: String,

        #[arg(
            long,
            default_value = "statements-completed.txt",
            help = "The progress file to inspect"
        )]
        progress_file: String,

        #[arg(
            long,
            help = "If set, prints the progress information as JSON instead of a table"
        )]
        json: bool,
    },
}
