use std::io::{self, Write};
use std::ops::{Deref, DerefMut};

use crossterm::{cursor, queue};

/// Writer with the terminal cursor hidden for as long as it is held
///
/// The cursor is shown again by [`HiddenCursor::restore`] or, on any other
/// exit path, when the guard is dropped.
pub struct HiddenCursor<'a, W: Write> {
    out: &'a mut W,
    restored: bool,
}

impl<'a, W: Write> HiddenCursor<'a, W> {
    pub fn hide(out: &'a mut W) -> io::Result<Self> {
        queue!(out, cursor::Hide)?;
        out.flush()?;
        Ok(Self {
            out,
            restored: false,
        })
    }

    /// Show the cursor again, reporting write errors
    pub fn restore(mut self) -> io::Result<()> {
        self.restored = true;
        show(&mut *self.out)
    }
}

fn show<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, cursor::Show)?;
    out.flush()
}

impl<W: Write> Deref for HiddenCursor<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        &*self.out
    }
}

impl<W: Write> DerefMut for HiddenCursor<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        &mut *self.out
    }
}

impl<W: Write> Drop for HiddenCursor<'_, W> {
    fn drop(&mut self) {
        if !self.restored {
            let _ = show(&mut *self.out);
        }
    }
}
