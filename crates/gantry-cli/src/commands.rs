use crate::args::{Cli, Commands};
use crate::handlers;
use anyhow::Result;
use is_terminal::IsTerminal;

pub fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        show_guidance();
        return Ok(());
    };

    let enable_color = !cli.no_color && std::io::stdout().is_terminal();

    match command {
        Commands::Summary { trace } => handlers::summary::handle(&trace, cli.format, enable_color),
        Commands::Chart { trace, output } => handlers::chart::handle(&trace, &output),
        Commands::Extract {
            trace,
            output,
            data_only,
            fields,
        } => handlers::extract::handle(&trace, &output, data_only, &fields),
        Commands::Fusion { trace } => handlers::fusion::handle(&trace, cli.format),
    }
}

fn show_guidance() {
    println!("gantry - agent runtime trace analyzer\n");
    println!("Point it at a JSONL trace file:");
    println!("  gantry summary trace.jsonl           # per-category stats and anomalies");
    println!("  gantry chart trace.jsonl -o out.html # HTML gantt of the call timeline");
    println!("  gantry extract trace.jsonl           # raw records as JSON");
    println!("  gantry fusion trace.jsonl            # split->fused savings estimate\n");
    println!("For all options:");
    println!("  gantry --help");
}
