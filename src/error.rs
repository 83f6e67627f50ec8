use failure::Fail;

#[derive(Debug, Fail, PartialEq, Eq)]
pub enum TrackError {
    #[fail(display = "track contains no fixes")]
    Empty,
    #[fail(display = "fix {} has an out of range coordinate", _0)]
    CoordinateOutOfRange(usize),
    #[fail(display = "fix {} does not advance the clock", _0)]
    NonMonotonicTime(usize),
}
