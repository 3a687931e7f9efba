//! 2 KiB console work RAM, visible at $0000-$1FFF through 0x0800 mirrors.
//! Every byte powers on as 0xFF.

pub const CPU_RAM_SIZE: usize = 0x0800;

pub struct Ram {
    cells: Box<[u8; CPU_RAM_SIZE]>,
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    pub fn new() -> Self {
        Self {
            cells: Box::new([0xFF; CPU_RAM_SIZE]),
        }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[fold(addr)]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.cells[fold(addr)] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells[..]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.cells[..]
    }
}

#[inline]
fn fold(addr: u16) -> usize {
    addr as usize % CPU_RAM_SIZE
}
