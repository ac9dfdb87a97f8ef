use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::warehouse::Warehouse;
use crate::store::{DataFile, StorageBackend};

/// Writes products and orders back to their files in full.
pub fn run<B: StorageBackend>(warehouse: &mut Warehouse<B>) -> Result<CmdResult> {
    warehouse.save()?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Saved {} products to {} and {} orders to {}.",
        warehouse.inventory().len(),
        warehouse.describe(DataFile::Inventory),
        warehouse.orders().len(),
        warehouse.describe(DataFile::Orders),
    )));
    Ok(result)
}
