use meridian_core::StatusRecord;
use meridian_ports::StatusSink;

/// Status sink writing one log line per record
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn emit(&self, record: &StatusRecord) {
        log::info!(
            "[Status] {} price={} change_24h={:.2}% bot_profit={} confidence={:.1}%",
            record.pair,
            record.current_price,
            record.price_change_24h,
            record.bot_profit,
            record.average_confidence
        );
    }
}
