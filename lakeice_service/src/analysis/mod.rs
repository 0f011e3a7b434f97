/// Data shaping for the lake ice charts.
///
/// Everything here is a pure, synchronous transform over parsed rows. The
/// outputs are plain serializable structures that a chart layer can draw
/// without further computation.
///
/// Submodules:
/// - `yearly`   : day-of-year statistics across years, rotated to Aug 1.
/// - `phenology`: freeze/break-up intervals on a shared ice-year axis.
/// - `coverage` : the raw ice cover series split by sensor class.

pub mod coverage;
pub mod phenology;
pub mod yearly;
