//! Protobuf bindings of the V2Ray management API.
//!
//! Generated by `build.rs` from the files under `proto/`. Modules nest by
//! protobuf package so cross-package references resolve.

use prost::Message;

#[allow(clippy::all)]
pub mod v2ray {
    pub mod core {
        pub mod common {
            pub mod serial {
                tonic::include_proto!("v2ray.core.common.serial");
            }
            pub mod protocol {
                tonic::include_proto!("v2ray.core.common.protocol");
            }
        }
        pub mod proxy {
            pub mod vmess {
                tonic::include_proto!("v2ray.core.proxy.vmess");
            }
        }
        pub mod app {
            pub mod proxyman {
                pub mod command {
                    tonic::include_proto!("v2ray.core.app.proxyman.command");
                }
            }
            pub mod stats {
                pub mod command {
                    tonic::include_proto!("v2ray.core.app.stats.command");
                }
            }
        }
    }
}

pub use v2ray::core::app::proxyman::command as proxyman;
pub use v2ray::core::app::stats::command as stats;
pub use v2ray::core::common::{protocol, serial};
pub use v2ray::core::proxy::vmess;

/// Messages that can be wrapped in a [`serial::TypedMessage`].
pub trait TypedName: Message + Sized {
    /// Fully qualified protobuf message name.
    const TYPE_NAME: &'static str;

    fn to_typed_message(&self) -> serial::TypedMessage {
        serial::TypedMessage {
            r#type: Self::TYPE_NAME.to_string(),
            value: self.encode_to_vec(),
        }
    }
}

impl TypedName for vmess::Account {
    const TYPE_NAME: &'static str = "v2ray.core.proxy.vmess.Account";
}

impl TypedName for proxyman::AddUserOperation {
    const TYPE_NAME: &'static str = "v2ray.core.app.proxyman.command.AddUserOperation";
}

impl TypedName for proxyman::RemoveUserOperation {
    const TYPE_NAME: &'static str = "v2ray.core.app.proxyman.command.RemoveUserOperation";
}
