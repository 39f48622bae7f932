/*
[INPUT]:  Account credentials and HTTP client
[OUTPUT]: Session context for feed connections
[POS]:    Auth layer - handles PredictIt session establishment
[UPDATE]: When auth flow changes
*/

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub use session::SessionContext;
