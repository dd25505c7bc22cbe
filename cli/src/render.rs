use chrono::TimeDelta;
use cubesweeper_core::{Coord, GameStatus, Session, TileView};
use ndarray::Array2;

pub fn tile_char(tile: TileView) -> char {
    use TileView::*;
    match tile {
        Covered => '#',
        Flagged => 'F',
        Uncovered(0) => '.',
        // 1-9 then a-q, up to the 26 neighbors of a cube
        Uncovered(count) => char::from_digit(count.into(), 36).unwrap_or('?'),
        Mine => '*',
        Exploded => 'X',
        IncorrectFlag => 'x',
    }
}

/// Draws a layer with x growing to the right and y growing downwards.
pub fn render_layer(z: Coord, layer: &Array2<TileView>) -> String {
    let (width, height) = layer.dim();
    let mut out = format!("layer z={z}\n");

    out.push_str("   ");
    for x in 0..width {
        out.push_str(&format!("{:>3}", x));
    }
    out.push('\n');

    for y in 0..height {
        out.push_str(&format!("{:>3}", y));
        for x in 0..width {
            out.push_str("  ");
            out.push(tile_char(layer[(x, y)]));
        }
        out.push('\n');
    }
    out
}

/// `HH:MM:SS`, hours keep growing past a day.
pub fn format_elapsed(elapsed: Option<TimeDelta>) -> String {
    let secs = elapsed.map_or(0, |elapsed| elapsed.num_seconds().max(0));
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

pub fn status_line(session: &Session) -> String {
    // read the time once so the line is consistent even right at the end of a game
    let elapsed = session.elapsed_time();
    let status = match session.status() {
        GameStatus::NotStarted => "not started",
        GameStatus::Ongoing => "playing",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    };
    let (width, height, depth) = session.grid().size();
    format!(
        "{status} | {width}x{height}x{depth} | cleared {}/{} | flags {} | mines left {} | {}",
        session.cleared(),
        session.safe_cubes(),
        session.flagged(),
        session.mines_left(),
        format_elapsed(elapsed),
    )
}
