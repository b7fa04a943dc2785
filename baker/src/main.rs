use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use structopt::StructOpt;

use baker::aggregate_textures::{
    aggregate_textures_with_params, AggregateTexturesParams,
};

#[derive(StructOpt)]
#[structopt(about = "Projective texture baking toolkit")]
struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    #[structopt(name = "aggregate-textures")]
    AggregateTextures(AggregateTexturesParams),
}

fn main() {
    let opts = Opts::from_args();

    let _ = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    let res = match opts.command {
        Command::AggregateTextures(params) => {
            aggregate_textures_with_params(&params)
        }
    };

    if let Err(err) = res {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
