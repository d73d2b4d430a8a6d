// CPU bus device seam
//
// The PPU hangs off the CPU bus as a memory-mapped device covering
// $2000-$3FFF. The trait lives here so a driver can mount the PPU next to
// other devices without knowing anything about its internals.

/// A device mapped into the CPU address space
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// Some devices have side effects on read (e.g., PPU PPUSTATUS clears flags),
    /// so this method takes &mut self.
    ///
    /// # Arguments
    /// * `addr` - The address to read from (device-specific addressing)
    ///
    /// # Returns
    /// The byte value at the specified address
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    ///
    /// # Arguments
    /// * `addr` - The address to write to (device-specific addressing)
    /// * `data` - The byte value to write
    fn write(&mut self, addr: u16, data: u8);
}
