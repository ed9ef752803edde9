use std::{fs::File, path::PathBuf, process::exit};

use cipta::*;
use clap::{Parser, Subcommand};

#[derive(Subcommand, Debug)]
enum Command {
    /// Points-to analysis with on-the-fly call graph construction
    Pta {
        #[arg(short, long)]
        entry: Option<String>,
        #[arg(short, long)]
        dump: Option<PathBuf>,
    },
    /// Class hierarchy analysis call graph
    Cha {
        #[arg(short, long)]
        entry: Option<String>,
    },
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long)]
    log: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,

    input: PathBuf,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let args = Args::parse();

    if let Some(log) = &args.log {
        let log_file = File::create(log).unwrap_or_else(|e| {
            eprintln!("cannot create {}: {}", log.display(), e);
            exit(1)
        });
        let level = if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(log_file)
            .init();
    }

    if let Err(e) = run(args) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(args: Args) -> Result<(), andersen::Error> {
    match args.command {
        Command::Pta { entry, dump } => {
            let conf = config::Config { entry };
            let (program, res) = andersen::analyze_path(&args.input, &conf)?;
            let stats = res.stats();
            println!("reachable methods: {}", res.call_graph().reachable_methods().len());
            println!("call edges: {}", res.call_graph().num_edges());
            println!("pointers: {}", res.pointers().len());
            println!("pfg edges: {}", res.pfg().num_edges());
            println!("objects: {}", res.objects().count());
            println!("worklist pops: {} ({} empty)", stats.pops, stats.empty_deltas);
            if let Some(dump) = dump {
                let text = res.display(&program).to_string();
                std::fs::write(&dump, text).map_err(|source| andersen::Error::Io {
                    path: dump,
                    source,
                })?;
            }
        }
        Command::Cha { entry } => {
            let program = andersen::read_program(&args.input)?;
            let entry = config::entry_method(&program, &config::Config { entry })?;
            let cg = cha::build_call_graph(&program, entry);
            for m in cg.reachable_methods() {
                println!("{}", program.method_name(*m));
            }
            for edge in cg.edges() {
                println!(
                    "{} -{}-> {}",
                    program.stmt_label(edge.call_site),
                    edge.kind,
                    program.method_name(edge.callee)
                );
            }
        }
    }
    Ok(())
}
