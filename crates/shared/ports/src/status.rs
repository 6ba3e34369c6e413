use meridian_core::StatusRecord;

/// Port for the observability sink receiving per-pair status records
pub trait StatusSink: Send + Sync {
    fn emit(&self, record: &StatusRecord);
}
