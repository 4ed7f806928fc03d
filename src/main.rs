use anyhow::Context;
use anyhow::bail;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quadlife::Board;
use quadlife::GolBoard;
use quadlife::RuleSet;

const GLIDER: [(i64, i64); 5] = [(1, 2), (2, 1), (0, 0), (1, 0), (2, 0)];

const USAGE: &str = "usage: quadlife <generations> [rule] [x,y ...]";

fn parse_cell(arg: &str) -> anyhow::Result<(i64, i64)> {
    let Some((x, y)) = arg.split_once(',') else {
        bail!("expected a cell like 3,-4, found \"{arg}\"")
    };

    let x = x.trim().parse::<i64>().with_context(|| format!("invalid x in \"{arg}\""))?;
    let y = y.trim().parse::<i64>().with_context(|| format!("invalid y in \"{arg}\""))?;

    Ok((x, y))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let Some(generations) = args.first() else {
        bail!(USAGE)
    };
    let generations = generations
        .parse::<u64>()
        .with_context(|| format!("invalid generation count \"{generations}\""))?;

    let mut rest = &args[1..];

    let rules = match rest.first() {
        Some(rule) if rule.starts_with(['b', 'B', 's', 'S']) => {
            rest = &rest[1..];
            rule.parse::<RuleSet>()
                .with_context(|| format!("invalid rule \"{rule}\""))?
        }
        _ => RuleSet::default(),
    };

    let cells = if rest.is_empty() {
        GLIDER.to_vec()
    } else {
        rest.iter()
            .map(|arg| parse_cell(arg))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let mut board = Board::with_rules(rules);
    for (x, y) in cells {
        board = board
            .add_cell(x, y)
            .with_context(|| format!("failed to seed cell ({x}, {y})"))?;
    }

    info!(%rules, generations, "starting simulation");

    for generation in 1..=generations {
        board = board.step();

        let cells = board.live_cells();
        println!("{generation}: {cells:?}");

        if board.is_empty() {
            info!(generation, "everything died");
            break;
        }
    }

    let stats = board.stats();
    info!(
        nodes = board.node_count(),
        hits = stats.hits,
        misses = stats.misses,
        "done"
    );

    Ok(())
}
