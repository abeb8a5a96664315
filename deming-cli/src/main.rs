//! Deming CLI binary: run a task through the PDCA agent and print the Markdown answer.
//!
//! `deming [OPTIONS] [TASK]...` or `deming -m TEXT`; `deming graph [--dot]` prints the graph.

mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deming::{PdcaConfig, SearchProviderKind};
use deming_cli::{graph_topology, run_task, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "deming")]
#[command(about = "Deming: solve a task with a Plan-Do-Check-Act agent and web search")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Task description (or pass as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Positional args: task description when -m/--message is not used
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,

    /// Model as provider/model (default: MODEL or openai/gpt-4o-mini)
    #[arg(long, value_name = "ID")]
    model: Option<String>,

    /// Results per search call (default: MAX_SEARCH_RESULTS or 10)
    #[arg(long, value_name = "N")]
    max_search_results: Option<usize>,

    /// Retries per step before it goes to Act anyway (default: MAX_RETRIES or 3)
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Search rounds per Do attempt (default: MAX_TOOL_ROUNDS or 1)
    #[arg(long, value_name = "N")]
    max_tool_rounds: Option<u32>,

    /// Max node executions per run (default: RECURSION_LIMIT or 100)
    #[arg(long, value_name = "N")]
    recursion_limit: Option<usize>,

    /// Search backend: tavily or exa (default: SEARCH_PROVIDER or tavily)
    #[arg(long, value_name = "NAME", value_parser = parse_search_provider)]
    search_provider: Option<SearchProviderKind>,

    /// Verbose: phase progress and logs on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Also write the answer to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Print the PDCA graph topology
    Graph {
        /// Graphviz DOT instead of text
        #[arg(long)]
        dot: bool,
    },
}

fn parse_search_provider(s: &str) -> Result<SearchProviderKind, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(Command::Graph { dot }) = args.cmd {
        println!("{}", graph_topology(dot)?);
        return Ok(());
    }

    let config = match PdcaConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("deming: config: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(args.verbose)?;

    let task = args.message.or_else(|| {
        if args.rest.is_empty() {
            None
        } else {
            Some(args.rest.join(" "))
        }
    });
    let Some(task) = task.filter(|t| !t.trim().is_empty()) else {
        eprintln!("deming: provide a task via -m/--message or positional args");
        std::process::exit(1);
    };

    let opts = RunOptions {
        task,
        model: args.model,
        max_search_results: args.max_search_results,
        max_retries: args.max_retries,
        max_tool_rounds: args.max_tool_rounds,
        recursion_limit: args.recursion_limit,
        search_provider: args.search_provider,
        verbose: args.verbose,
        output: args.output,
    };

    match run_task(config, &opts).await {
        Ok(answer) => {
            println!("{}", answer);
            let _ = std::io::Write::flush(&mut std::io::stdout());
            Ok(())
        }
        Err(e) => {
            eprintln!("deming: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_words_form_the_task() {
        let args = Args::parse_from(["deming", "--max-retries", "2", "is", "it", "raining?"]);
        assert_eq!(args.rest, vec!["is", "it", "raining?"]);
        assert_eq!(args.max_retries, Some(2));
        assert!(args.cmd.is_none());
    }

    #[test]
    fn search_provider_flag_is_parsed() {
        let args = Args::parse_from(["deming", "--search-provider", "exa", "-m", "task"]);
        assert_eq!(args.search_provider, Some(SearchProviderKind::Exa));
        assert!(Args::try_parse_from(["deming", "--search-provider", "bing", "x"]).is_err());
    }

    #[test]
    fn graph_subcommand_takes_dot_flag() {
        let args = Args::parse_from(["deming", "graph", "--dot"]);
        assert!(matches!(args.cmd, Some(Command::Graph { dot: true })));
    }
}
