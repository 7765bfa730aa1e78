//! Allocation domain models.
//!
//! Provides the data types shared by the optimizer, the scheduler boundary
//! and the scenario generator.
//!
//! # Domain Mappings
//!
//! | u-hostalloc | Cloud | Batch cluster |
//! |-------------|-------|---------------|
//! | Task | Cloudlet | Job |
//! | Host | Physical server | Node |
//! | VmDescriptor | VM flavour | Slot profile |
//! | Allocation | Placement plan | Job → node map |

mod allocation;
mod host;
mod task;

pub use allocation::{Allocation, AllocationError};
pub use host::{
    fleet_cpu_capacity, fleet_ram_capacity, Host, HostUsage, UsageLedger, VmDescriptor,
};
pub use task::Task;
