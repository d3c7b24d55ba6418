//! Target factories and the ULX3S base SoC.
//!
//! A `Target` produces a SoC in two steps: `platform` declares the physical
//! connections, `build` constructs the SoC on that platform. Splitting the
//! two lets a composed target add connections before the base construction
//! runs.

use std::sync::Arc;

use socext_core::{
    Access, BitField, Csr, Documented, ModuleDoc, RegisterBank, Signal, StorageRegister, Submodule,
};
use socext_platform::Platform;

use crate::error::Result;
use crate::options::SocOptions;
use crate::soc::Soc;

/// A named SoC factory.
pub trait Target: Send + Sync {
    /// Name the factory is looked up by.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Declare the platform's physical connections.
    fn platform(&self, options: &SocOptions) -> Result<Platform>;

    /// Construct the SoC on `platform`.
    fn build(&self, platform: Platform, options: &SocOptions) -> Result<Soc>;

    /// Declare the platform, then build on it.
    fn construct(&self, options: &SocOptions) -> Result<Soc> {
        options.validate()?;
        let platform = self.platform(options)?;
        self.build(platform, options)
    }
}

/// Clock and reset generator. Holds the clock and reset inputs.
#[derive(Debug)]
pub struct Crg {
    pub clk: Signal,
    pub rst_n: Signal,
    pub sys_clk_freq: u64,
}

impl Submodule for Crg {
    fn kind(&self) -> &str {
        "crg"
    }

    fn signals(&self) -> Vec<&Signal> {
        vec![&self.clk, &self.rst_n]
    }
}

/// Self-clearing soft reset. Writing 1 restores the registers it covers to
/// their reset values; it always reads 0.
#[derive(Debug)]
struct SoftReset {
    layout: StorageRegister,
    covers: Vec<Arc<StorageRegister>>,
}

impl Csr for SoftReset {
    fn name(&self) -> &str {
        self.layout.name()
    }

    fn description(&self) -> &str {
        self.layout.description()
    }

    fn fields(&self) -> &[BitField] {
        self.layout.fields()
    }

    fn access(&self) -> Access {
        self.layout.access()
    }

    fn read(&self) -> u64 {
        0
    }

    fn write(&self, value: u64) -> bool {
        if value & 1 == 1 {
            for register in &self.covers {
                register.reset();
            }
            tracing::debug!(registers = self.covers.len(), "soft reset");
        }
        true
    }
}

/// SoC controller: soft reset and a scratch register for bus checks.
#[derive(Debug)]
pub struct SocController {
    reset: SoftReset,
    scratch: Arc<StorageRegister>,
}

impl SocController {
    pub fn new() -> Self {
        let scratch = Arc::new(StorageRegister::new(
            "scratch",
            "Scratch space for checking bus access and endianness",
            32,
            0x1234_5678,
        ));
        Self {
            reset: SoftReset {
                layout: StorageRegister::new(
                    "reset",
                    "Write a 1 to restore the controller registers to their reset values",
                    1,
                    0,
                ),
                covers: vec![Arc::clone(&scratch)],
            },
            scratch,
        }
    }
}

impl Default for SocController {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank for SocController {
    fn csrs(&self) -> Vec<&dyn Csr> {
        vec![&self.reset as &dyn Csr, &*self.scratch]
    }
}

impl Submodule for SocController {
    fn kind(&self) -> &str {
        "ctrl"
    }

    fn as_register_bank(&self) -> Option<&dyn RegisterBank> {
        Some(self)
    }
}

/// User LEDs driven from one storage register, one bit per LED.
#[derive(Debug)]
pub struct Leds {
    out: StorageRegister,
    pads: Vec<Signal>,
}

impl Leds {
    /// Request every `user_led` instance declared on `platform`.
    pub fn new(platform: &Platform) -> Result<Self> {
        let count = platform.io().iter().filter(|d| d.name == "user_led").count();
        let pads = (0..count)
            .map(|i| platform.request("user_led", i))
            .collect::<socext_platform::Result<Vec<_>>>()?;
        Ok(Self {
            out: StorageRegister::new("out", "LED outputs", pads.len() as u32, 0),
            pads,
        })
    }

    fn drive(&self) {
        let value = self.out.read();
        for (i, pad) in self.pads.iter().enumerate() {
            pad.set(value >> i & 1 == 1);
        }
    }
}

impl Csr for Leds {
    fn name(&self) -> &str {
        self.out.name()
    }

    fn description(&self) -> &str {
        self.out.description()
    }

    fn fields(&self) -> &[BitField] {
        self.out.fields()
    }

    fn access(&self) -> Access {
        self.out.access()
    }

    fn read(&self) -> u64 {
        self.out.read()
    }

    fn write(&self, value: u64) -> bool {
        self.out.write(value);
        self.drive();
        true
    }
}

impl RegisterBank for Leds {
    fn csrs(&self) -> Vec<&dyn Csr> {
        vec![self as &dyn Csr]
    }
}

impl Documented for Leds {
    fn documentation(&self) -> ModuleDoc {
        ModuleDoc {
            title: "User LEDs".into(),
            body: format!("{} LEDs, bit n drives user_led n.", self.pads.len()),
        }
    }
}

impl Submodule for Leds {
    fn kind(&self) -> &str {
        "leds"
    }

    fn signals(&self) -> Vec<&Signal> {
        self.pads.iter().collect()
    }

    fn as_register_bank(&self) -> Option<&dyn RegisterBank> {
        Some(self)
    }

    fn as_documented(&self) -> Option<&dyn Documented> {
        Some(self)
    }
}

/// The Radiona ULX3S base SoC: clocking, controller and user LEDs.
#[derive(Debug, Default)]
pub struct Ulx3sTarget;

impl Target for Ulx3sTarget {
    fn name(&self) -> &str {
        "ulx3s"
    }

    fn description(&self) -> &str {
        "Radiona ULX3S (ECP5 LFE5U-45F, 25 MHz)"
    }

    fn platform(&self, _options: &SocOptions) -> Result<Platform> {
        Ok(Platform::ulx3s())
    }

    fn build(&self, platform: Platform, options: &SocOptions) -> Result<Soc> {
        let crg = Crg {
            clk: platform.request("clk25", 0)?,
            rst_n: platform.request("rst_n", 0)?,
            sys_clk_freq: options.sys_clk_freq,
        };
        let leds = if options.with_leds {
            Some(Leds::new(&platform)?)
        } else {
            None
        };

        let mut soc = Soc::new(self.name(), platform, options.clone());
        soc.add_submodule("crg", Box::new(crg))?;
        soc.add_submodule("ctrl", Box::new(SocController::new()))?;
        soc.add_csr("ctrl")?;
        if let Some(leds) = leds {
            soc.add_submodule("leds", Box::new(leds))?;
            soc.add_csr("leds")?;
        }
        Ok(soc)
    }
}
