use flexi_logger::{
	DeferredNow,
	filter::{LogLineFilter, LogLineWriter},
};

/// Dependencies whose debug output drowns the gateway's own,
/// with the most verbose level still let through.
const QUIET_MODULES: &[(&str, log::LevelFilter)] = &[
	("hyper", log::LevelFilter::Info),
	("rustls", log::LevelFilter::Info),
];

fn is_quieted(module_path: Option<&str>, level: log::Level) -> bool {
	let Some(module_path) = module_path else {
		return false;
	};

	QUIET_MODULES
		.iter()
		.find(|(prefix, _)| module_path.starts_with(prefix))
		.is_some_and(|(_, max)| level > *max)
}

struct QuietDependencies;

impl LogLineFilter for QuietDependencies {
	fn write(
		&self,
		now: &mut DeferredNow,
		record: &log::Record,
		log_line_writer: &dyn LogLineWriter,
	) -> std::io::Result<()> {
		if is_quieted(record.module_path(), record.level()) {
			return Ok(());
		}

		log_line_writer.write(now, record)
	}
}

/// Logs to stderr, with the level taken from `RUST_LOG` (`info` if unset).
pub fn setup_logger() -> eyre::Result<flexi_logger::LoggerHandle> {
	Ok(flexi_logger::Logger::try_with_env_or_str("info")?
		.format(flexi_logger::colored_default_format)
		.filter(Box::new(QuietDependencies))
		.log_to_stderr()
		.start()?)
}

#[cfg(test)]
mod tests {
	use log::Level;

	use super::*;

	#[test]
	fn only_dependency_chatter_is_dropped() {
		assert!(is_quieted(Some("hyper::proto::h1::conn"), Level::Debug));
		assert!(is_quieted(Some("hyper_util::client::legacy"), Level::Trace));
		assert!(is_quieted(Some("rustls::client::hs"), Level::Debug));

		assert!(!is_quieted(Some("hyper::proto::h1::conn"), Level::Info));
		assert!(!is_quieted(Some("rustls::client::hs"), Level::Warn));
		assert!(!is_quieted(Some("dmsgate::soap::gateway"), Level::Trace));
		assert!(!is_quieted(None, Level::Trace));
	}
}
