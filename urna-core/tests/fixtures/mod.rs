pub mod faults;

#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use factories::*;
#[allow(unused_imports)]
pub use faults::*;
