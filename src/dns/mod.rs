mod dnspod;
mod provider;

pub use dnspod::{
    DnspodClient, ModifyDynamicDnsRequest, DNSPOD_API_HOST, DNSPOD_ENDPOINT, DNSPOD_VERSION,
    MODIFY_DYNAMIC_DNS,
};
pub use provider::{ModifyOutcome, RecordUpdater};
