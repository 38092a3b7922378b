pub mod notice;
pub mod roster;

pub use notice::{Notice, NoticeKind};
pub use roster::{Activity, Roster};
