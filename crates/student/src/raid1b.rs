use minos::{out, outln};

const TOP: [char; 3] = ['/', '*', '\\'];
const MIDDLE: [char; 3] = ['*', ' ', '*'];
const BOTTOM: [char; 3] = ['\\', '*', '/'];

/// Draw an `x` by `y` rectangle framed with `/*\`, `* *` and `\*/`.
pub fn raid1b(x: i64, y: i64) {
    if x < 1 || y < 1 {
        return;
    }
    for row in 0..y {
        let pattern = if row == 0 {
            TOP
        } else if row == y - 1 {
            BOTTOM
        } else {
            MIDDLE
        };
        line(x, pattern);
    }
}

fn line(x: i64, [first, fill, last]: [char; 3]) {
    for col in 0..x {
        let c = if col == 0 {
            first
        } else if col == x - 1 {
            last
        } else {
            fill
        };
        out!("{}", c);
    }
    outln!();
}
