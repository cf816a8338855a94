mod credential;
mod movie;
mod notification;
mod preferences;

pub use credential::{Credential, TokenPair, User};
pub use movie::{CollectionEntry, MovieId, MovieSummary, RatedMovie, Recommendations};
pub use notification::{Notification, Severity};
pub use preferences::{PreferencesPatch, UserPreferences};
