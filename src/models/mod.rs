pub mod driver;
pub mod model;
pub mod truck;

pub use driver::Driver;
pub use model::Model;
pub use truck::Truck;
