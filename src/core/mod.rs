pub mod analyze;
pub mod client;
pub mod dispatcher;
pub mod player;
pub mod protocol;
pub mod regress;
pub mod results;
pub mod session;
pub mod sgf;
pub mod twogtp;

pub use crate::domain::model::{Command, Response};
pub use crate::domain::ports::{GoPlayer, GtpClient, MatchSettings, Storage};
pub use crate::utils::error::Result;
