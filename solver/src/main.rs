use clap::Parser;

use floodlit::{
    moves_of, solve_board, solve_board_greedy, solve_bottom_right, Board, SolveOptions,
};

/// Generate a Flood-It board and report how the solvers fare on it.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Board side length.
    #[arg(long, default_value_t = Board::DEFAULT_SIZE)]
    size: usize,
    /// Number of colors.
    #[arg(long, default_value_t = Board::DEFAULT_COLORS)]
    colors: usize,
    /// Solve an explicit board instead of a random one (digits, row by row).
    #[arg(long)]
    board: Option<String>,
    /// Also run the exhaustive admissible search.
    #[arg(long)]
    admissible: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let board = match &args.board {
        Some(text) => Board::parse(text)?,
        None => Board::random(args.size, args.colors)?,
    };
    println!("{board}\n");

    let greedy = solve_board_greedy(&board, 0)?;
    println!("greedy:       {} moves", greedy.len() - 1);

    let weighted = solve_board(&board, &SolveOptions::default())?;
    println!(
        "weighted:     {} moves, playing {:?}",
        weighted.len() - 1,
        moves_of(&weighted)
    );

    let corner = solve_bottom_right(&board, 0.5)?;
    println!("bottom right: {} moves", corner.len() - 1);

    if args.admissible {
        let optimal = solve_board(
            &board,
            &SolveOptions {
                admissible: true,
                ..SolveOptions::default()
            },
        )?;
        println!("admissible:   {} moves", optimal.len() - 1);
    }

    Ok(())
}
