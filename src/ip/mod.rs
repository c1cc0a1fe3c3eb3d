mod external;
mod lookup;
mod resolver;

pub use external::{ExternalIpGetter, PublicIpSource};
pub use lookup::{DnsLookup, SystemResolver};
pub use resolver::{PublicIpResolver, Resolution};
