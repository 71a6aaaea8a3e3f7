// 4.0: tick arithmetic. order sizes and prices must land on market tick
// boundaries or the execution layer rejects them.
//
// the milli-tick detour in the down/up variants absorbs binary-float noise
// before quantizing: sizes arrive as f64 products that sit a few ulps off an
// exact tick multiple, and a naive floor would drop a whole tick.

/// Largest tick multiple <= size. A non-positive tick passes the value through.
pub fn round_down_to_tick(size: f64, tick: f64) -> f64 {
    if tick <= 0.0 {
        return size;
    }
    let milli_ticks = (size * 1000.0 / tick).round() as i64;
    let num_ticks = (milli_ticks / 1000) as f64;
    num_ticks * tick
}

/// Smallest tick multiple >= size. A non-positive tick passes the value through.
pub fn round_up_to_tick(size: f64, tick: f64) -> f64 {
    if tick <= 0.0 {
        return size;
    }
    let milli_ticks = (size * 1000.0 / tick).round() as i64;
    let mut num_ticks = (milli_ticks / 1000) as f64;
    if milli_ticks % 1000 > 0 {
        num_ticks += 1.0;
    }
    num_ticks * tick
}

/// Nearest tick multiple, half away from zero.
pub fn round_to_nearest_tick(size: f64, tick: f64) -> f64 {
    if tick <= 0.0 {
        return size;
    }
    let num_ticks = (size / tick).round();
    num_ticks * tick
}
