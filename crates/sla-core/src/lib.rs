pub mod decision;
pub mod ids;
pub mod incident;
pub mod model;
pub mod outcomes;
pub mod policy;
pub mod report;

pub use decision::*;
pub use ids::*;
pub use incident::*;
pub use model::*;
pub use outcomes::*;
pub use policy::*;
pub use report::*;
