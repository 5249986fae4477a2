// src/sensor/transaction.rs

use super::Ld2413;
use crate::common::{
    command::{ConfigAck, ConfigCommand, ReadBack},
    error::Ld2413Error,
    hal_traits::{Ld2413Serial, Ld2413Timer},
    parser::FrameScanner,
    timing,
};
use core::time::Duration;

impl<IF> Ld2413<IF>
where
    IF: Ld2413Serial + Ld2413Timer,
{
    /// Sends a command and waits for its acknowledgement using the session timeout.
    pub fn send_command(
        &mut self,
        command: &ConfigCommand,
    ) -> Result<ConfigAck, Ld2413Error<IF::Error>> {
        let timeout = self.config.command_timeout;
        self.send_command_with_timeout(command, timeout)
    }

    /// Sends a command and busy-waits up to `timeout` for the acknowledgement
    /// echoing its opcode.
    ///
    /// Anything buffered on the stream beforehand is discarded. Acknowledgements
    /// for other opcodes are skipped without extending the deadline.
    pub fn send_command_with_timeout(
        &mut self,
        command: &ConfigCommand,
        timeout: Duration,
    ) -> Result<ConfigAck, Ld2413Error<IF::Error>> {
        self.drain_input()?;

        let frame = command.encode();
        log::trace!("ld2413: tx {:02x?}", frame.as_slice());
        self.send_bytes(&frame)?;

        match self.wait_for_ack(command.opcode(), timeout) {
            Ok(ack) => {
                log::debug!("ld2413: command {:#06x} acknowledged", command.opcode());
                Ok(ack)
            }
            Err(e) => {
                if e.is_timeout() {
                    log::warn!("ld2413: command {:#06x} timed out", command.opcode());
                }
                Err(e)
            }
        }
    }

    fn wait_for_ack(
        &mut self,
        opcode: u16,
        timeout: Duration,
    ) -> Result<ConfigAck, Ld2413Error<IF::Error>> {
        let budget = timing::as_millis_u32(timeout);
        let poll_us = timing::as_micros_u32(self.config.poll_interval);
        let mut scanner = FrameScanner::acknowledgements();
        let start = self.interface.now_ms();

        while self.interface.now_ms().wrapping_sub(start) < budget {
            let byte = match self.interface.read_byte() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => {
                    self.interface.delay_us(poll_us);
                    continue;
                }
                Err(nb::Error::Other(e)) => return Err(Ld2413Error::Io(e)),
            };

            let Some(frame) = scanner.feed(byte) else {
                continue;
            };
            match ConfigAck::from_frame(frame) {
                Some(ack) if ack.opcode() == opcode => return Ok(ack),
                Some(ack) => log::debug!(
                    "ld2413: skipping ack for {:#06x}, waiting for {:#06x}",
                    ack.opcode(),
                    opcode
                ),
                None => log::trace!("ld2413: config frame too short for an opcode"),
            }
        }

        Err(Ld2413Error::Timeout)
    }

    // --- Public command methods ---

    pub fn enable_config_mode(&mut self) -> Result<(), Ld2413Error<IF::Error>> {
        self.send_command(&ConfigCommand::enable_config())?;
        self.config_mode = true;
        log::debug!("ld2413: config mode entered");
        Ok(())
    }

    pub fn end_config_mode(&mut self) -> Result<(), Ld2413Error<IF::Error>> {
        self.send_command(&ConfigCommand::end_config())?;
        self.config_mode = false;
        log::debug!("ld2413: config mode left");
        Ok(())
    }

    /// Sets the report period. Values outside 50..=1000 ms are clamped.
    pub fn set_report_period(&mut self, period_ms: u16) -> Result<(), Ld2413Error<IF::Error>> {
        self.send_command(&ConfigCommand::set_report_period(period_ms)).map(drop)
    }

    pub fn set_min_distance(&mut self, mm: u16) -> Result<(), Ld2413Error<IF::Error>> {
        self.send_command(&ConfigCommand::set_min_distance(mm)).map(drop)
    }

    pub fn set_max_distance(&mut self, mm: u16) -> Result<(), Ld2413Error<IF::Error>> {
        self.send_command(&ConfigCommand::set_max_distance(mm)).map(drop)
    }

    pub fn factory_reset(&mut self) -> Result<(), Ld2413Error<IF::Error>> {
        self.send_command(&ConfigCommand::factory_reset()).map(drop)
    }

    // --- Read-back methods ---
    //
    // The acknowledgement layout for these is not documented, so they refuse
    // without touching the wire. Callers who know the layout can use
    // `send_command` with `ReadBack::opcode()` and decode the `ConfigAck`.

    pub fn read_firmware_version(
        &mut self,
    ) -> Result<heapless::String<32>, Ld2413Error<IF::Error>> {
        Err(Ld2413Error::Unsupported(ReadBack::FirmwareVersion))
    }

    pub fn read_report_period(&mut self) -> Result<u16, Ld2413Error<IF::Error>> {
        Err(Ld2413Error::Unsupported(ReadBack::ReportPeriod))
    }

    pub fn read_min_distance(&mut self) -> Result<u16, Ld2413Error<IF::Error>> {
        Err(Ld2413Error::Unsupported(ReadBack::MinDistance))
    }

    pub fn read_max_distance(&mut self) -> Result<u16, Ld2413Error<IF::Error>> {
        Err(Ld2413Error::Unsupported(ReadBack::MaxDistance))
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::opcode;
    use crate::sensor::mock::{ack_frame, report_frame, MockCommError, MockInterface};
    use crate::sensor::SessionConfig;

    fn sensor() -> Ld2413<MockInterface> {
        Ld2413::new(MockInterface::new())
    }

    /// Argument bytes of the command the mock saw written.
    fn written_args(mock: &MockInterface) -> &[u8] {
        let tx = mock.tx.as_slice();
        &tx[8..tx.len() - 4]
    }

    #[test]
    fn test_enable_config_mode_success() {
        let mut sensor = sensor();
        sensor.interface.reply_on_flush(&ack_frame(opcode::ENABLE_CONFIG, &[0x00, 0x00]));

        assert!(sensor.enable_config_mode().is_ok());
        assert!(sensor.is_config_mode());
        assert_eq!(
            sensor.interface.tx.as_slice(),
            ConfigCommand::enable_config().encode().as_slice()
        );
    }

    #[test]
    fn test_enable_config_mode_timeout() {
        let mut sensor = sensor();
        let result = sensor.enable_config_mode();

        assert!(matches!(result, Err(Ld2413Error::Timeout)));
        assert!(!sensor.is_config_mode());
        let elapsed = sensor.interface.elapsed_ms();
        assert!(elapsed >= 1000, "returned after {} ms", elapsed);
        assert!(elapsed <= 1001, "returned after {} ms", elapsed);
    }

    #[test]
    fn test_end_config_mode_failure_keeps_flag() {
        let mut sensor = sensor();
        sensor.interface.reply_on_flush(&ack_frame(opcode::ENABLE_CONFIG, &[0x00, 0x00]));
        sensor.enable_config_mode().unwrap();

        assert!(sensor.end_config_mode().is_err());
        assert!(sensor.is_config_mode());

        sensor.interface.reply_on_flush(&ack_frame(opcode::END_CONFIG, &[0x00, 0x00]));
        assert!(sensor.end_config_mode().is_ok());
        assert!(!sensor.is_config_mode());
    }

    #[test]
    fn test_stale_input_is_not_taken_as_ack() {
        let mut sensor = sensor();
        // A matching ack already sitting in the buffer before the command is sent.
        sensor.interface.stage_read_data(&ack_frame(opcode::FACTORY_RESET, &[0x00, 0x00]));

        assert!(matches!(sensor.factory_reset(), Err(Ld2413Error::Timeout)));
    }

    #[test]
    fn test_mismatched_opcode_is_skipped() {
        let mut sensor = sensor();
        let mut reply = heapless::Vec::<u8, 64>::new();
        reply.extend_from_slice(&ack_frame(opcode::END_CONFIG, &[0x00, 0x00])).unwrap();
        reply.extend_from_slice(&ack_frame(opcode::SET_MIN_DISTANCE, &[0x00, 0x00])).unwrap();
        sensor.interface.reply_on_flush(&reply);

        assert!(sensor.set_min_distance(200).is_ok());
        assert_eq!(written_args(&sensor.interface), &200u16.to_le_bytes());
    }

    #[test]
    fn test_only_mismatched_opcode_times_out() {
        let mut sensor = sensor();
        sensor.interface.reply_on_flush(&ack_frame(opcode::END_CONFIG, &[0x00, 0x00]));
        assert!(matches!(sensor.set_max_distance(5000), Err(Ld2413Error::Timeout)));
    }

    #[test]
    fn test_report_period_clamped_on_wire() {
        let mut low = sensor();
        low.interface.reply_on_flush(&ack_frame(opcode::SET_REPORT_PERIOD, &[]));
        low.set_report_period(30).unwrap();
        assert_eq!(written_args(&low.interface), &50u16.to_le_bytes());

        let mut high = sensor();
        high.interface.reply_on_flush(&ack_frame(opcode::SET_REPORT_PERIOD, &[]));
        high.set_report_period(5000).unwrap();
        assert_eq!(written_args(&high.interface), &1000u16.to_le_bytes());
    }

    #[test]
    fn test_ack_footer_not_required() {
        let mut sensor = sensor();
        // Header, length, opcode, status; no footer.
        sensor.interface.reply_on_flush(&[0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xA2, 0x00, 0x00, 0x00]);
        assert!(sensor.factory_reset().is_ok());
    }

    #[test]
    fn test_noise_and_reports_before_ack() {
        let mut sensor = sensor();
        let mut reply = heapless::Vec::<u8, 64>::new();
        reply.extend_from_slice(&[0x00, 0xFD, 0x13]).unwrap();
        reply.extend_from_slice(&report_frame(99.0)).unwrap();
        // Oversized length: dropped, scanning restarts.
        reply.extend_from_slice(&[0xFD, 0xFC, 0xFB, 0xFA, 0xFF, 0xFF]).unwrap();
        reply.extend_from_slice(&ack_frame(opcode::SET_MAX_DISTANCE, &[0x00, 0x00])).unwrap();
        sensor.interface.reply_on_flush(&reply);

        assert!(sensor.set_max_distance(3000).is_ok());
        // The command path does not decode reports.
        assert!(!sensor.has_new_data());
    }

    #[test]
    fn test_send_command_returns_full_payload() {
        let mut sensor = sensor();
        sensor.interface.reply_on_flush(&ack_frame(0x0000, &[0x00, 0x00, 0x01, 0x02]));
        let cmd = ConfigCommand::new(0x0000);

        let ack = sensor.send_command(&cmd).unwrap();
        assert_eq!(ack.opcode(), 0x0000);
        assert_eq!(ack.payload(), &[0x00, 0x00, 0x00, 0x00, 0x01, 0x02]);
        assert_eq!(ack.args(), &[0x00, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_custom_timeout() {
        let config = SessionConfig::default().with_command_timeout(Duration::from_millis(200));
        let mut sensor = Ld2413::with_config(MockInterface::new(), config);
        assert!(sensor.factory_reset().is_err());
        assert!(sensor.interface.elapsed_ms() < 300);

        let start = sensor.interface.elapsed_ms();
        let result = sensor.send_command_with_timeout(&ConfigCommand::factory_reset(), Duration::from_millis(50));
        assert!(result.unwrap_err().is_timeout());
        assert!(sensor.interface.elapsed_ms() - start < 100);
    }

    #[test]
    fn test_command_resets_background_scanner() {
        let mut sensor = sensor();
        let frame = report_frame(12.0);
        sensor.interface.stage_read_data(&frame[..6]);
        sensor.update().unwrap();
        assert!(!sensor.scanner.is_idle());

        sensor.interface.reply_on_flush(&ack_frame(opcode::FACTORY_RESET, &[]));
        sensor.factory_reset().unwrap();
        assert!(sensor.scanner.is_idle());

        sensor.interface.stage_read_data(&report_frame(13.0));
        sensor.update().unwrap();
        assert_eq!(sensor.distance_mm(), 13.0);
    }

    #[test]
    fn test_read_error_during_wait() {
        let mut sensor = sensor();
        sensor.interface.read_error = true;
        assert!(matches!(sensor.factory_reset(), Err(Ld2413Error::Io(MockCommError))));
    }

    #[test]
    fn test_read_backs_are_unsupported() {
        let mut sensor = sensor();
        assert!(matches!(
            sensor.read_firmware_version(),
            Err(Ld2413Error::Unsupported(ReadBack::FirmwareVersion))
        ));
        assert!(matches!(
            sensor.read_report_period(),
            Err(Ld2413Error::Unsupported(ReadBack::ReportPeriod))
        ));
        assert!(matches!(
            sensor.read_min_distance(),
            Err(Ld2413Error::Unsupported(ReadBack::MinDistance))
        ));
        assert!(matches!(
            sensor.read_max_distance(),
            Err(Ld2413Error::Unsupported(ReadBack::MaxDistance))
        ));
        assert!(sensor.interface.tx.is_empty());
        assert_eq!(sensor.interface.elapsed_ms(), 0);
    }
}
