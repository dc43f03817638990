use tandem_core::SignalMessage;

/// Outgoing half of the signaling transport. The relay connection in the
/// browser; a recording stub in tests.
pub trait SignalSink {
    fn send(&self, msg: SignalMessage);
}
