//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the relay shift register and the status LED, exposing them through
//! [`RelayOutputPort`] and [`IndicatorPort`].  This is the only module in the
//! system that touches actual GPIO.  On non-espidf targets it is
//! instantiated with any `embedded-hal` pins (see the integration tests).

use embedded_hal::digital::OutputPin;

use crate::app::ports::{IndicatorPort, RelayOutputPort};
use crate::drivers::shift_register::ShiftRegister;
use crate::drivers::status_led::{LedPattern, StatusLed};
use crate::encoder::PhysicalFrame;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<L, C, D, P> {
    relays: ShiftRegister<L, C, D>,
    led: StatusLed<P>,
}

impl<L, C, D, P> HardwareAdapter<L, C, D, P>
where
    L: OutputPin,
    C: OutputPin,
    D: OutputPin,
    P: OutputPin,
{
    pub fn new(relays: ShiftRegister<L, C, D>, led: StatusLed<P>) -> Self {
        Self { relays, led }
    }

    /// Last frame actually latched onto the relays.
    pub fn last_frame(&self) -> Option<PhysicalFrame> {
        self.relays.last_frame()
    }

    pub fn led_is_lit(&self) -> bool {
        self.led.is_lit()
    }
}

// ── RelayOutputPort implementation ────────────────────────────

impl<L, C, D, P> RelayOutputPort for HardwareAdapter<L, C, D, P>
where
    L: OutputPin,
    C: OutputPin,
    D: OutputPin,
    P: OutputPin,
{
    fn write_frame(&mut self, frame: PhysicalFrame) {
        self.relays.write_frame(frame);
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<L, C, D, P> IndicatorPort for HardwareAdapter<L, C, D, P>
where
    L: OutputPin,
    C: OutputPin,
    D: OutputPin,
    P: OutputPin,
{
    fn show(&mut self, pattern: LedPattern, now_ms: u64) {
        self.led.show(pattern, now_ms);
    }
}

// ── ESP-IDF wiring ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub type EspPin = esp_idf_hal::gpio::PinDriver<
    'static,
    esp_idf_hal::gpio::AnyOutputPin,
    esp_idf_hal::gpio::Output,
>;

#[cfg(target_os = "espidf")]
pub type EspHardware = HardwareAdapter<EspPin, EspPin, EspPin, EspPin>;

#[cfg(target_os = "espidf")]
impl EspHardware {
    /// Claim the GPIOs listed in [`crate::pins`].
    ///
    /// Must be called once, before anything else drives these pins.
    pub fn take() -> Result<Self, esp_idf_hal::sys::EspError> {
        use crate::pins;
        use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};

        let output = |gpio: i32| -> Result<EspPin, esp_idf_hal::sys::EspError> {
            // SAFETY: each number in `pins` is claimed exactly once, here.
            PinDriver::output(unsafe { AnyOutputPin::new(gpio) })
        };

        let relays = ShiftRegister::new(
            output(pins::SR_LATCH_GPIO)?,
            output(pins::SR_CLOCK_GPIO)?,
            output(pins::SR_DATA_GPIO)?,
        );
        let led = StatusLed::new(output(pins::STATUS_LED_GPIO)?);
        log::info!(
            "Hardware: relay bank on GPIO {}/{}/{}, LED on GPIO {}",
            pins::SR_LATCH_GPIO,
            pins::SR_CLOCK_GPIO,
            pins::SR_DATA_GPIO,
            pins::STATUS_LED_GPIO
        );
        Ok(Self::new(relays, led))
    }
}
