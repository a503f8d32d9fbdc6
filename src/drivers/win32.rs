//! Native backend: real top-level windows via the Win32 API.

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use windows_sys::Win32::Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, RECT};
use windows_sys::Win32::Graphics::Gdi::{
    CombineRgn, CreateRectRgn, CreateSolidBrush, DeleteObject, HBRUSH, RGN_DIFF, SetWindowRgn,
};
use windows_sys::Win32::System::Console::{
    CTRL_BREAK_EVENT, CTRL_C_EVENT, CTRL_CLOSE_EVENT, SetConsoleCtrlHandler,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, VK_LBUTTON};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, EnumWindows,
    GetForegroundWindow, GetSystemMetrics, GetWindowRect, GetWindowTextLengthW, GetWindowTextW,
    HWND_TOPMOST, IsWindow, IsWindowVisible, LWA_ALPHA, MSG, PM_REMOVE, PeekMessageW,
    RegisterClassW, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
    SW_HIDE, SW_SHOWNOACTIVATE, SWP_NOACTIVATE, SWP_NOSIZE, SWP_NOZORDER,
    SetLayeredWindowAttributes, SetWindowPos, ShowWindow, TranslateMessage, UnregisterClassW,
    WNDCLASSW,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

use super::{Overlay, WindowSystem};
use crate::constants::{HIGHLIGHT_ALPHA, HIGHLIGHT_BORDER, HIGHLIGHT_RGB};
use crate::error::WindowError;
use crate::geometry::Rect;

const OVERLAY_CLASS: &str = "WindowGravityHighlight";
// ERROR_CLASS_ALREADY_EXISTS
const CLASS_EXISTS: u32 = 1410;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn last_error(op: &'static str) -> WindowError {
    WindowError::Os {
        op,
        code: unsafe { GetLastError() },
    }
}

unsafe extern "system" fn on_console_event(ctrl_type: u32) -> i32 {
    match ctrl_type {
        CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT => {
            INTERRUPTED.store(true, Ordering::SeqCst);
            1
        }
        _ => 0,
    }
}

/// Route Ctrl+C (and console close) to a flag instead of killing the process.
/// Returns the flag the step loop should watch.
pub fn install_interrupt_handler() -> Result<&'static AtomicBool, WindowError> {
    if unsafe { SetConsoleCtrlHandler(Some(on_console_event), 1) } == 0 {
        return Err(last_error("SetConsoleCtrlHandler"));
    }
    Ok(&INTERRUPTED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hwnd(HWND);

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> i32 {
    let handles = unsafe { &mut *(lparam as *mut Vec<Hwnd>) };
    handles.push(Hwnd(hwnd));
    1
}

#[derive(Debug, Default)]
pub struct Win32Desktop;

impl Win32Desktop {
    pub fn new() -> Self {
        Self
    }
}

impl WindowSystem for Win32Desktop {
    type Handle = Hwnd;
    type Overlay = Win32Overlay;

    fn enumerate_windows(&mut self) -> Result<Vec<Hwnd>, WindowError> {
        let mut handles: Vec<Hwnd> = Vec::new();
        let ok = unsafe {
            EnumWindows(
                Some(collect_window),
                &mut handles as *mut Vec<Hwnd> as LPARAM,
            )
        };
        if ok == 0 {
            return Err(last_error("EnumWindows"));
        }
        Ok(handles)
    }

    fn is_visible(&mut self, handle: Hwnd) -> bool {
        unsafe { IsWindowVisible(handle.0) != 0 }
    }

    fn title(&mut self, handle: Hwnd) -> String {
        let len = unsafe { GetWindowTextLengthW(handle.0) };
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u16; len as usize + 1];
        let copied = unsafe { GetWindowTextW(handle.0, buf.as_mut_ptr(), buf.len() as i32) };
        buf.truncate(copied.max(0) as usize);
        String::from_utf16_lossy(&buf)
    }

    fn rect(&mut self, handle: Hwnd) -> Result<Rect, WindowError> {
        if unsafe { IsWindow(handle.0) } == 0 {
            return Err(WindowError::Unavailable { op: "GetWindowRect" });
        }
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if unsafe { GetWindowRect(handle.0, &mut rect) } == 0 {
            return Err(last_error("GetWindowRect"));
        }
        Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn set_position(&mut self, handle: Hwnd, x: i32, y: i32) -> Result<(), WindowError> {
        let ok = unsafe {
            SetWindowPos(
                handle.0,
                ptr::null_mut(),
                x,
                y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        };
        if ok != 0 {
            return Ok(());
        }
        if unsafe { IsWindow(handle.0) } == 0 {
            Err(WindowError::Unavailable { op: "SetWindowPos" })
        } else {
            Err(last_error("SetWindowPos"))
        }
    }

    fn foreground_window(&mut self) -> Option<Hwnd> {
        let hwnd = unsafe { GetForegroundWindow() };
        (!hwnd.is_null()).then_some(Hwnd(hwnd))
    }

    fn primary_button_down(&mut self) -> bool {
        let state = unsafe { GetAsyncKeyState(i32::from(VK_LBUTTON)) };
        (state as u16 & 0x8000) != 0
    }

    fn virtual_bounds(&mut self) -> Rect {
        let (x, y, w, h) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };
        Rect::from_origin_size(x, y, w, h)
    }

    fn create_overlay(&mut self) -> Result<Win32Overlay, WindowError> {
        Win32Overlay::create()
    }
}

/// Layered, click-through, topmost popup whose window region is a hollow
/// frame [`HIGHLIGHT_BORDER`] pixels thick.
///
/// The window class paints with the brush of the overlay that registered it.
/// That overlay unregisters the class on drop and only then frees the brush.
#[derive(Debug)]
pub struct Win32Overlay {
    hwnd: HWND,
    instance: HINSTANCE,
    // Set only when this overlay registered the class.
    class_brush: Option<HBRUSH>,
    size: Option<(i32, i32)>,
}

impl Win32Overlay {
    fn create() -> Result<Self, WindowError> {
        let class_name = wide(OVERLAY_CLASS);
        let (r, g, b) = HIGHLIGHT_RGB;
        let color = u32::from(r) | (u32::from(g) << 8) | (u32::from(b) << 16);
        unsafe {
            let instance = GetModuleHandleW(ptr::null());
            let brush = CreateSolidBrush(color);
            if brush.is_null() {
                return Err(WindowError::Overlay("CreateSolidBrush failed".into()));
            }
            let mut class: WNDCLASSW = std::mem::zeroed();
            class.lpfnWndProc = Some(DefWindowProcW);
            class.hInstance = instance;
            class.hbrBackground = brush;
            class.lpszClassName = class_name.as_ptr();
            let class_brush = if RegisterClassW(&class) != 0 {
                Some(brush)
            } else {
                let code = GetLastError();
                DeleteObject(brush as *mut c_void);
                if code != CLASS_EXISTS {
                    return Err(WindowError::Overlay(format!(
                        "RegisterClassW failed (os error {code})"
                    )));
                }
                None
            };
            let mut overlay = Self {
                hwnd: ptr::null_mut(),
                instance,
                class_brush,
                size: None,
            };
            overlay.hwnd = CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_NOACTIVATE,
                class_name.as_ptr(),
                ptr::null(),
                WS_POPUP,
                0,
                0,
                0,
                0,
                ptr::null_mut(),
                ptr::null_mut(),
                instance,
                ptr::null(),
            );
            if overlay.hwnd.is_null() {
                return Err(WindowError::Overlay(format!(
                    "CreateWindowExW failed (os error {})",
                    GetLastError()
                )));
            }
            if SetLayeredWindowAttributes(overlay.hwnd, 0, HIGHLIGHT_ALPHA, LWA_ALPHA) == 0 {
                return Err(WindowError::Overlay(format!(
                    "SetLayeredWindowAttributes failed (os error {})",
                    GetLastError()
                )));
            }
            Ok(overlay)
        }
    }

    /// Cut the window down to a frame. Only needed when the size changes.
    fn reshape(&mut self, width: i32, height: i32) -> Result<(), WindowError> {
        if self.size == Some((width, height)) {
            return Ok(());
        }
        let border = HIGHLIGHT_BORDER;
        unsafe {
            let outer = CreateRectRgn(0, 0, width, height);
            let inner = CreateRectRgn(border, border, width - border, height - border);
            if outer.is_null() || inner.is_null() {
                DeleteObject(outer as *mut c_void);
                DeleteObject(inner as *mut c_void);
                return Err(last_error("CreateRectRgn"));
            }
            CombineRgn(outer, outer, inner, RGN_DIFF);
            DeleteObject(inner as *mut c_void);
            // on success the system owns `outer`
            if SetWindowRgn(self.hwnd, outer, 1) == 0 {
                DeleteObject(outer as *mut c_void);
                return Err(last_error("SetWindowRgn"));
            }
        }
        self.size = Some((width, height));
        Ok(())
    }

    /// Let the overlay paint; nothing else posts to this thread.
    fn pump_messages(&self) {
        unsafe {
            let mut msg: MSG = std::mem::zeroed();
            while PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_REMOVE) != 0 {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl Overlay for Win32Overlay {
    fn move_to(&mut self, rect: Rect) -> Result<(), WindowError> {
        let ok = unsafe {
            SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_NOACTIVATE,
            )
        };
        if ok == 0 {
            return Err(last_error("SetWindowPos"));
        }
        self.reshape(rect.width(), rect.height())?;
        self.pump_messages();
        Ok(())
    }

    fn show(&mut self) -> Result<(), WindowError> {
        unsafe { ShowWindow(self.hwnd, SW_SHOWNOACTIVATE) };
        self.pump_messages();
        Ok(())
    }

    fn hide(&mut self) -> Result<(), WindowError> {
        unsafe { ShowWindow(self.hwnd, SW_HIDE) };
        self.pump_messages();
        Ok(())
    }
}

impl Drop for Win32Overlay {
    fn drop(&mut self) {
        unsafe {
            if !self.hwnd.is_null() {
                DestroyWindow(self.hwnd);
            }
            let Some(brush) = self.class_brush else {
                return;
            };
            // Fails while another overlay of this class is alive; the brush
            // must then outlive it.
            let class_name = wide(OVERLAY_CLASS);
            if UnregisterClassW(class_name.as_ptr(), self.instance) != 0 {
                DeleteObject(brush as *mut c_void);
            }
        }
    }
}
