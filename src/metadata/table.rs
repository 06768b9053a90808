//! The built-in VCP feature table.
//!
//! Each entry carries flags per MCCS version column. Sorted by code.

use super::{Access, Category, ValueEntry, VersionFlags};
use crate::version::MccsVersion;

pub(crate) const COLOR: u8 = 0x01;
pub(crate) const PROFILE: u8 = 0x02;

const RW_C: VersionFlags = VersionFlags::new(Access::ReadWrite, Category::Continuous);
const RW_CC: VersionFlags = VersionFlags::new(Access::ReadWrite, Category::ComplexContinuous);
const RO_CC: VersionFlags = VersionFlags::new(Access::ReadOnly, Category::ComplexContinuous);
const RW_SNC: VersionFlags = VersionFlags::new(Access::ReadWrite, Category::SimpleNc);
const RO_SNC: VersionFlags = VersionFlags::new(Access::ReadOnly, Category::SimpleNc);
const RW_CNC: VersionFlags = VersionFlags::new(Access::ReadWrite, Category::ComplexNc);
const RO_CNC: VersionFlags = VersionFlags::new(Access::ReadOnly, Category::ComplexNc);
const RW_NCC: VersionFlags = VersionFlags::new(Access::ReadWrite, Category::NcContinuous);
const WO_NC: VersionFlags = VersionFlags::new(Access::WriteOnly, Category::WriteOnlyNc);
const RW_T: VersionFlags = VersionFlags::new(Access::ReadWrite, Category::Table);
const RO_T: VersionFlags = VersionFlags::new(Access::ReadOnly, Category::Table);
const WO_T: VersionFlags = VersionFlags::new(Access::WriteOnly, Category::WriteOnlyTable);

#[derive(Copy, Clone, Debug)]
enum Column {
    V20,
    V21,
    V30,
    V22,
}

/// Column fallback order for a version.
///
/// MCCS 1.0 and anything older than 2.0 share the 2.0 column.
fn columns(version: MccsVersion) -> &'static [Column] {
    use self::Column::*;

    match version.major_minor() {
        Some((major, _)) if major >= 3 => &[V30, V22, V21, V20],
        Some((2, minor)) if minor >= 2 => &[V22, V21, V20],
        Some((2, 1)) => &[V21, V20],
        Some(_) => &[V20],
        None => &[V21, V20, V22, V30],
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct FeatureEntry {
    pub code: u8,
    pub name: &'static str,
    pub desc: &'static str,
    pub subsets: u8,
    v20: Option<VersionFlags>,
    v21: Option<VersionFlags>,
    v30: Option<VersionFlags>,
    v22: Option<VersionFlags>,
    v20_values: Option<&'static [ValueEntry]>,
    v21_values: Option<&'static [ValueEntry]>,
    v30_values: Option<&'static [ValueEntry]>,
    v22_values: Option<&'static [ValueEntry]>,
}

const BLANK: FeatureEntry = FeatureEntry {
    code: 0,
    name: "",
    desc: "",
    subsets: 0,
    v20: None,
    v21: None,
    v30: None,
    v22: None,
    v20_values: None,
    v21_values: None,
    v30_values: None,
    v22_values: None,
};

impl FeatureEntry {
    fn flags(&self, column: Column) -> Option<VersionFlags> {
        match column {
            Column::V20 => self.v20,
            Column::V21 => self.v21,
            Column::V30 => self.v30,
            Column::V22 => self.v22,
        }
    }

    fn values(&self, column: Column) -> Option<&'static [ValueEntry]> {
        match column {
            Column::V20 => self.v20_values,
            Column::V21 => self.v21_values,
            Column::V30 => self.v30_values,
            Column::V22 => self.v22_values,
        }
    }

    /// Flags and value names for `version`, or `None` if the feature doesn't exist there.
    pub fn resolve(&self, version: MccsVersion) -> Option<(VersionFlags, Option<&'static [ValueEntry]>)> {
        let columns = columns(version);
        let flags = columns.iter().filter_map(|&c| self.flags(c)).next()?;
        let values = if flags.category.is_non_continuous() {
            columns.iter().filter_map(|&c| self.values(c)).next()
        } else {
            None
        };

        Some((flags, values))
    }
}

pub(crate) fn entries() -> &'static [FeatureEntry] {
    FEATURES
}

pub(crate) fn find(code: u8) -> Option<&'static FeatureEntry> {
    FEATURES.binary_search_by_key(&code, |e| e.code).ok().map(|i| &FEATURES[i])
}

static NEW_CONTROL_VALUES: &[ValueEntry] = &[
    ValueEntry::new(0x01, "No new control values"),
    ValueEntry::new(0x02, "One or more new control values have been saved"),
    ValueEntry::new(0xff, "No user controls are present"),
];

static SOFT_CONTROLS: &[ValueEntry] = &[
    ValueEntry::new(0x00, "No button active"),
    ValueEntry::new(0x01, "Button 1 active"),
    ValueEntry::new(0x02, "Button 2 active"),
    ValueEntry::new(0x03, "Button 3 active"),
    ValueEntry::new(0x04, "Button 4 active"),
    ValueEntry::new(0x05, "Button 5 active"),
    ValueEntry::new(0x06, "Button 6 active"),
    ValueEntry::new(0x07, "Button 7 active"),
    ValueEntry::new(0xff, "No user controls are present"),
];

static COLOR_PRESETS: &[ValueEntry] = &[
    ValueEntry::new(0x01, "sRGB"),
    ValueEntry::new(0x02, "Display Native"),
    ValueEntry::new(0x03, "4000 K"),
    ValueEntry::new(0x04, "5000 K"),
    ValueEntry::new(0x05, "6500 K"),
    ValueEntry::new(0x06, "7500 K"),
    ValueEntry::new(0x07, "8200 K"),
    ValueEntry::new(0x08, "9300 K"),
    ValueEntry::new(0x09, "10000 K"),
    ValueEntry::new(0x0a, "11500 K"),
    ValueEntry::new(0x0b, "User 1"),
    ValueEntry::new(0x0c, "User 2"),
    ValueEntry::new(0x0d, "User 3"),
];

static AUTO_SETUP: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Auto setup not active"),
    ValueEntry::new(0x01, "Performing auto setup"),
    ValueEntry::new(0x02, "Enable continuous/periodic auto setup"),
];

static INPUT_SOURCES: &[ValueEntry] = &[
    ValueEntry::new(0x01, "VGA-1"),
    ValueEntry::new(0x02, "VGA-2"),
    ValueEntry::new(0x03, "DVI-1"),
    ValueEntry::new(0x04, "DVI-2"),
    ValueEntry::new(0x05, "Composite video 1"),
    ValueEntry::new(0x06, "Composite video 2"),
    ValueEntry::new(0x07, "S-Video-1"),
    ValueEntry::new(0x08, "S-Video-2"),
    ValueEntry::new(0x09, "Tuner-1"),
    ValueEntry::new(0x0a, "Tuner-2"),
    ValueEntry::new(0x0b, "Tuner-3"),
    ValueEntry::new(0x0c, "Component video (YPrPb/YCrCb) 1"),
    ValueEntry::new(0x0d, "Component video (YPrPb/YCrCb) 2"),
    ValueEntry::new(0x0e, "Component video (YPrPb/YCrCb) 3"),
    ValueEntry::new(0x0f, "DisplayPort-1"),
    ValueEntry::new(0x10, "DisplayPort-2"),
    ValueEntry::new(0x11, "HDMI-1"),
    ValueEntry::new(0x12, "HDMI-2"),
];

static SPEAKER_VOLUME: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Fixed (default) level"),
    ValueEntry::new(0xff, "Mute"),
];

static SPEAKER_SELECT: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Front L/R"),
    ValueEntry::new(0x01, "Side L/R"),
    ValueEntry::new(0x02, "Rear L/R"),
    ValueEntry::new(0x03, "Center/Subwoofer"),
];

static AMBIENT_LIGHT_SENSOR: &[ValueEntry] = &[
    ValueEntry::new(0x01, "Disabled"),
    ValueEntry::new(0x02, "Enabled"),
];

static MIRROR: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Normal mode"),
    ValueEntry::new(0x01, "Mirrored"),
];

static DISPLAY_SCALING: &[ValueEntry] = &[
    ValueEntry::new(0x01, "No scaling"),
    ValueEntry::new(0x02, "Max image, no aspect ration distortion"),
    ValueEntry::new(0x03, "Max vertical image, no aspect ratio distortion"),
    ValueEntry::new(0x04, "Max horizontal image, no aspect ratio distortion"),
    ValueEntry::new(0x05, "Max vertical image with aspect ratio distortion"),
    ValueEntry::new(0x06, "Max horizontal image with aspect ratio distortion"),
    ValueEntry::new(0x07, "Linear expansion (compression) on horizontal axis"),
    ValueEntry::new(0x08, "Linear expansion (compression) on h and v axes"),
    ValueEntry::new(0x09, "Squeeze mode"),
    ValueEntry::new(0x0a, "Non-linear expansion"),
];

static AUDIO_MUTE: &[ValueEntry] = &[
    ValueEntry::new(0x01, "Mute the audio"),
    ValueEntry::new(0x02, "Unmute the audio"),
];

static AUDIO_PROCESSOR_MODE: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Speaker off/Audio not supported"),
    ValueEntry::new(0x01, "Mono"),
    ValueEntry::new(0x02, "Stereo"),
    ValueEntry::new(0x03, "Stereo expanded"),
];

static ON_OFF: &[ValueEntry] = &[
    ValueEntry::new(0x01, "Off"),
    ValueEntry::new(0x02, "On"),
];

static WINDOW_SELECT: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Full display image area selected except active windows"),
    ValueEntry::new(0x01, "Window 1 selected"),
    ValueEntry::new(0x02, "Window 2 selected"),
    ValueEntry::new(0x03, "Window 3 selected"),
    ValueEntry::new(0x04, "Window 4 selected"),
    ValueEntry::new(0x05, "Window 5 selected"),
    ValueEntry::new(0x06, "Window 6 selected"),
    ValueEntry::new(0x07, "Window 7 selected"),
];

static SCREEN_ORIENTATION: &[ValueEntry] = &[
    ValueEntry::new(0x01, "0 degrees"),
    ValueEntry::new(0x02, "90 degrees"),
    ValueEntry::new(0x03, "180 degrees"),
    ValueEntry::new(0x04, "270 degrees"),
    ValueEntry::new(0xff, "Display cannot supply orientation"),
];

static SETTINGS: &[ValueEntry] = &[
    ValueEntry::new(0x01, "Store current settings in the monitor"),
    ValueEntry::new(0x02, "Restore factory defaults for current mode"),
];

static SUBPIXEL_LAYOUT: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Sub-pixel layout not defined"),
    ValueEntry::new(0x01, "Red/Green/Blue vertical stripe"),
    ValueEntry::new(0x02, "Red/Green/Blue horizontal stripe"),
    ValueEntry::new(0x03, "Blue/Green/Red vertical stripe"),
    ValueEntry::new(0x04, "Blue/Green/Red horizontal stripe"),
    ValueEntry::new(0x05, "Quad-pixel, red at top left"),
    ValueEntry::new(0x06, "Quad-pixel, red at bottom left"),
    ValueEntry::new(0x07, "Delta (triad)"),
    ValueEntry::new(0x08, "Mosaic"),
];

static SOURCE_COLOR_CODING: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Reserved"),
    ValueEntry::new(0x01, "4:4:4"),
    ValueEntry::new(0x02, "4:2:2"),
    ValueEntry::new(0x03, "4:2:0"),
];

static DISPLAY_TECHNOLOGY: &[ValueEntry] = &[
    ValueEntry::new(0x01, "CRT (shadow mask)"),
    ValueEntry::new(0x02, "CRT (aperture grill)"),
    ValueEntry::new(0x03, "LCD (active matrix)"),
    ValueEntry::new(0x04, "LCos"),
    ValueEntry::new(0x05, "Plasma"),
    ValueEntry::new(0x06, "OLED"),
    ValueEntry::new(0x07, "EL"),
    ValueEntry::new(0x08, "Dynamic MEM"),
    ValueEntry::new(0x09, "Static MEM"),
];

static OSD: &[ValueEntry] = &[
    ValueEntry::new(0x01, "OSD Disabled"),
    ValueEntry::new(0x02, "OSD Enabled"),
    ValueEntry::new(0xff, "Display cannot supply this information"),
];

static OSD_LANGUAGES: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Reserved value, must be ignored"),
    ValueEntry::new(0x01, "Chinese (traditional, Hantai)"),
    ValueEntry::new(0x02, "English"),
    ValueEntry::new(0x03, "French"),
    ValueEntry::new(0x04, "German"),
    ValueEntry::new(0x05, "Italian"),
    ValueEntry::new(0x06, "Japanese"),
    ValueEntry::new(0x07, "Korean"),
    ValueEntry::new(0x08, "Portuguese (Portugal)"),
    ValueEntry::new(0x09, "Russian"),
    ValueEntry::new(0x0a, "Spanish"),
    ValueEntry::new(0x0b, "Swedish"),
    ValueEntry::new(0x0c, "Turkish"),
    ValueEntry::new(0x0d, "Chinese (simplified / Kantai)"),
    ValueEntry::new(0x0e, "Portuguese (Brazil)"),
    ValueEntry::new(0x0f, "Arabic"),
    ValueEntry::new(0x10, "Bulgarian"),
    ValueEntry::new(0x11, "Croatian"),
    ValueEntry::new(0x12, "Czech"),
    ValueEntry::new(0x13, "Danish"),
    ValueEntry::new(0x14, "Dutch"),
    ValueEntry::new(0x15, "Estonian"),
    ValueEntry::new(0x16, "Finnish"),
    ValueEntry::new(0x17, "Greek"),
    ValueEntry::new(0x18, "Hebrew"),
    ValueEntry::new(0x19, "Hindi"),
    ValueEntry::new(0x1a, "Hungarian"),
    ValueEntry::new(0x1b, "Latvian"),
    ValueEntry::new(0x1c, "Lithuanian"),
    ValueEntry::new(0x1d, "Norwegian"),
    ValueEntry::new(0x1e, "Polish"),
    ValueEntry::new(0x1f, "Romanian"),
    ValueEntry::new(0x20, "Serbian"),
    ValueEntry::new(0x21, "Slovak"),
    ValueEntry::new(0x22, "Slovenian"),
    ValueEntry::new(0x23, "Thai"),
    ValueEntry::new(0x24, "Ukranian"),
    ValueEntry::new(0x25, "Vietnamese"),
];

static POWER_MODES: &[ValueEntry] = &[
    ValueEntry::new(0x01, "DPM: On,  DPMS: Off"),
    ValueEntry::new(0x02, "DPM: Off, DPMS: Standby"),
    ValueEntry::new(0x03, "DPM: Off, DPMS: Suspend"),
    ValueEntry::new(0x04, "DPM: Off, DPMS: Off"),
    ValueEntry::new(0x05, "Write only value to turn off display"),
];

static AUX_POWER: &[ValueEntry] = &[
    ValueEntry::new(0x01, "Disable auxiliary output power"),
    ValueEntry::new(0x02, "Enable auxiliary output power"),
];

static SCAN_MODES: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Normal operation"),
    ValueEntry::new(0x01, "Underscan"),
    ValueEntry::new(0x02, "Overscan"),
];

static IMAGE_MODES: &[ValueEntry] = &[
    ValueEntry::new(0x00, "No effect"),
    ValueEntry::new(0x01, "Full mode"),
    ValueEntry::new(0x02, "Zoom mode"),
    ValueEntry::new(0x03, "Squeeze mode"),
    ValueEntry::new(0x04, "Variable"),
];

static DISPLAY_MODES_V20: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Standard/Default mode"),
    ValueEntry::new(0x01, "Productivity"),
    ValueEntry::new(0x02, "Mixed"),
    ValueEntry::new(0x03, "Movie"),
    ValueEntry::new(0x04, "User defined"),
    ValueEntry::new(0x05, "Games"),
    ValueEntry::new(0x06, "Sports"),
    ValueEntry::new(0x07, "Professional (all signal processing disabled)"),
    ValueEntry::new(0x08, "Standard/Default mode with intermediate power consumption"),
    ValueEntry::new(0x09, "Standard/Default mode with low power consumption"),
    ValueEntry::new(0x0a, "Demonstration"),
    ValueEntry::new(0xf0, "Dynamic contrast"),
];

static DISPLAY_MODES_V30: &[ValueEntry] = &[
    ValueEntry::new(0x00, "Standard/Default mode"),
    ValueEntry::new(0x01, "Productivity"),
    ValueEntry::new(0x02, "Mixed"),
    ValueEntry::new(0x03, "Movie"),
    ValueEntry::new(0x04, "User defined"),
    ValueEntry::new(0x05, "Games"),
    ValueEntry::new(0x06, "Sports"),
    ValueEntry::new(0x07, "Professional (all signal processing disabled)"),
];

const CP: u8 = COLOR | PROFILE;

static FEATURES: &[FeatureEntry] = &[
    FeatureEntry { code: 0x01, name: "Degauss", desc: "Causes a CRT to perform a degauss cycle", v20: Some(WO_NC), ..BLANK },
    FeatureEntry { code: 0x02, name: "New control value", desc: "Indicates that a display user control (other than power) has been used to change and save (or autosave) a new value", v20: Some(RW_SNC), v20_values: Some(NEW_CONTROL_VALUES), ..BLANK },
    FeatureEntry { code: 0x03, name: "Soft controls", desc: "Allows display controls to be used as soft keys", v20: Some(RW_SNC), v20_values: Some(SOFT_CONTROLS), ..BLANK },
    FeatureEntry { code: 0x04, name: "Restore factory defaults", desc: "Restore all factory presets including brightness/contrast, geometry, color, and TV defaults", v20: Some(WO_NC), ..BLANK },
    FeatureEntry { code: 0x05, name: "Restore factory brightness/contrast defaults", desc: "Restore factory defaults for brightness and contrast", v20: Some(WO_NC), ..BLANK },
    FeatureEntry { code: 0x06, name: "Restore factory geometry defaults", desc: "Restore factory defaults for geometry adjustments", v20: Some(WO_NC), ..BLANK },
    FeatureEntry { code: 0x08, name: "Restore color defaults", desc: "Restore factory defaults for color settings", subsets: COLOR, v20: Some(WO_NC), ..BLANK },
    FeatureEntry { code: 0x0a, name: "Restore factory TV defaults", desc: "Restore factory defaults for TV functions", v20: Some(WO_NC), ..BLANK },
    FeatureEntry { code: 0x0b, name: "Color temperature increment", desc: "Color temperature increment used by feature 0Ch Color Temperature Request", subsets: COLOR, v20: Some(RO_CC), ..BLANK },
    FeatureEntry { code: 0x0c, name: "Color temperature request", desc: "Specifies a color temperature (degrees Kelvin)", subsets: CP, v20: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0x0e, name: "Clock", desc: "Increase/decrease the sampling clock frequency", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x10, name: "Brightness", desc: "Increase/decrease the brightness of the image", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x11, name: "Flesh tone enhancement", desc: "Select contrast enhancement algorithm respecting flesh tone region", subsets: COLOR, v21: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0x12, name: "Contrast", desc: "Increase/decrease the contrast of the image", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x13, name: "Backlight control", desc: "Increase/decrease the specified backlight control value", v20: Some(RW_C), v30: Some(RW_C.deprecated()), v22: Some(RW_C.deprecated()), ..BLANK },
    FeatureEntry { code: 0x14, name: "Select color preset", desc: "Select a specified color temperature", subsets: CP, v20: Some(RW_SNC), v30: Some(RW_CNC), v22: Some(RW_CNC), v20_values: Some(COLOR_PRESETS), ..BLANK },
    FeatureEntry { code: 0x16, name: "Video gain: Red", desc: "Increase/decrease the luminesence of red pixels", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x17, name: "User color vision compensation", desc: "Increase/decrease the degree of compensation", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x18, name: "Video gain: Green", desc: "Increase/decrease the luminesence of green pixels", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x1a, name: "Video gain: Blue", desc: "Increase/decrease the luminesence of blue pixels", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x1c, name: "Focus", desc: "Increase/decrease the focus of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x1e, name: "Auto setup", desc: "Perform autosetup function (H/V position, clock, clock phase, A/D converter, etc.)", v20: Some(RW_SNC), v20_values: Some(AUTO_SETUP), ..BLANK },
    FeatureEntry { code: 0x1f, name: "Auto color setup", desc: "Perform color autosetup function (R/G/B gain and offset, A/D setup, etc.)", subsets: COLOR, v21: Some(RW_SNC), v21_values: Some(AUTO_SETUP), ..BLANK },
    FeatureEntry { code: 0x20, name: "Horizontal Position (Phase)", desc: "Increasing (decreasing) this value moves the image toward the right (left) of the display", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x22, name: "Horizontal Size", desc: "Increase/decrease the width of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x24, name: "Horizontal Pincushion", desc: "Increasing (decreasing) this value causes the right and left sides of the image to become more (less) convex", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x26, name: "Horizontal Pincushion Balance", desc: "Increasing (decreasing) this value moves the center section of the image toward the right (left) side of the display", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x28, name: "Horizontal Convergence R/B", desc: "Increasing (decreasing) this value shifts the red pixels to the right (left) and the blue pixels left (right) across the image with respect to the green pixels", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x29, name: "Horizontal Convergence M/G", desc: "Increasing (decreasing) this value shifts the magenta pixels to the right (left) and the green pixels left (right) across the image with respect to the magenta (sic) pixels", v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x2a, name: "Horizontal Linearity", desc: "Increase/decrease the density of pixels in the image center", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x2c, name: "Horizontal Linearity Balance", desc: "Increasing (decreasing) this value shifts the density of pixels from the left (right) side to the right (left) side of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x2e, name: "Gray scale expansion", desc: "Gray scale expansion", subsets: COLOR, v22: Some(RW_CNC), v30: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0x30, name: "Vertical Position (Phase)", desc: "Increasing (decreasing) this value moves the image toward the top (bottom) edge of the display", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x32, name: "Vertical Size", desc: "Increase/decreasing the height of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x34, name: "Vertical Pincushion", desc: "Increasing (decreasing) this value will cause the top and bottom edges of the image to become more (less) convex", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x36, name: "Vertical Pincushion Balance", desc: "Increasing (decreasing) this value will move the center section of the image toward the top (bottom) edge of the display", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x38, name: "Vertical Convergence R/B", desc: "Increasing (decreasing) this value shifts the red pixels up (down) across the image and the blue pixels down (up) across the image with respect to the green pixels", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x39, name: "Vertical Convergence M/G", desc: "Increasing (decreasing) this value shifts the magenta pixels up (down) across the image and the green pixels down (up) across the image with respect to the magenta (sic) pixels", v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x3a, name: "Vertical Linearity", desc: "Increase/decrease the density of scan lines in the image center", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x3c, name: "Vertical Linearity Balance", desc: "Increase/decrease the density of scan lines in the image center", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x3e, name: "Clock phase", desc: "Increase/decrease the sampling clock phase shift", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x40, name: "Horizontal Parallelogram", desc: "Increasing (decreasing) this value shifts the top section of the image to the right (left) with respect to the bottom section of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x41, name: "Vertical Parallelogram", desc: "Increasing (decreasing) this value shifts the top section of the image to the right (left) with respect to the bottom section of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x42, name: "Horizontal Keystone", desc: "Increasing (decreasing) this value will increase (decrease) the ratio between the horizontal size at the top of the image and the horizontal size at the bottom of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x43, name: "Vertical Keystone", desc: "Increasing (decreasing) this value will increase (decrease) the ratio between the vertical size at the left of the image and the vertical size at the right of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x44, name: "Rotation", desc: "Increasing (decreasing) this value rotates the image (counter) clockwise around the center point of the screen", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x46, name: "Top Corner Flare", desc: "Increase/decrease the distance between the left and right sides at the top of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x48, name: "Top Corner Hook", desc: "Increasing (decreasing) this value moves the top of the image to the right (left)", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x4a, name: "Bottom Corner Flare", desc: "Increase/decrease the distance between the left and right sides at the bottom of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x4c, name: "Bottom Corner Hook", desc: "Increasing (decreasing) this value moves the bottom end of the image to the right (left)", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x52, name: "Active control", desc: "Read id of one feature that has changed, 0x00 indicates no more", v20: Some(RO_CNC), ..BLANK },
    FeatureEntry { code: 0x54, name: "Performance Preservation", desc: "Controls display performance preservation features", v22: Some(RW_CNC), v30: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0x56, name: "Horizontal Moire", desc: "Increase/decrease horizontal moire cancellation", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x58, name: "Vertical Moire", desc: "Increase/decrease vertical moire cancellation", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x59, name: "6 axis saturation: Red", desc: "Increase/decrease red saturation", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x5a, name: "6 axis saturation: Yellow", desc: "Increase/decrease yellow saturation", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x5b, name: "6 axis saturation: Green", desc: "Increase/decrease green saturation", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x5c, name: "6 axis saturation: Cyan", desc: "Increase/decrease cyan saturation", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x5d, name: "6 axis saturation: Blue", desc: "Increase/decrease blue saturation", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x5e, name: "6 axis saturation: Magenta", desc: "Increase/decrease magenta saturation", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x60, name: "Input Source", desc: "Selects active video source", v20: Some(RW_SNC), v30: Some(RW_T), v22: Some(RW_SNC), v20_values: Some(INPUT_SOURCES), ..BLANK },
    FeatureEntry { code: 0x62, name: "Audio speaker volume", desc: "Adjusts speaker volume", v20: Some(RW_C), v30: Some(RW_NCC), v22: Some(RW_NCC), v30_values: Some(SPEAKER_VOLUME), v22_values: Some(SPEAKER_VOLUME), ..BLANK },
    FeatureEntry { code: 0x63, name: "Speaker Select", desc: "Selects a group of speakers", v21: Some(RW_SNC), v21_values: Some(SPEAKER_SELECT), ..BLANK },
    FeatureEntry { code: 0x64, name: "Audio: Microphone Volume", desc: "Increase/decrease microphone gain", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x66, name: "Ambient light sensor", desc: "Enable/Disable ambient light sensor", v21: Some(RW_SNC), v21_values: Some(AMBIENT_LIGHT_SENSOR), ..BLANK },
    FeatureEntry { code: 0x6b, name: "Backlight Level: White", desc: "Increase/decrease the white backlight level", v22: Some(RW_C), v30: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x6c, name: "Video black level: Red", desc: "Increase/decrease the black level of red pixels", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x6d, name: "Backlight Level: Red", desc: "Increase/decrease the red backlight level", v22: Some(RW_C), v30: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x6e, name: "Video black level: Green", desc: "Increase/decrease the black level of green pixels", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x6f, name: "Backlight Level: Green", desc: "Increase/decrease the green backlight level", v22: Some(RW_C), v30: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x70, name: "Video black level: Blue", desc: "Increase/decrease the black level of blue pixels", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x71, name: "Backlight Level: Blue", desc: "Increase/decrease the blue backlight level", v22: Some(RW_C), v30: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x72, name: "Gamma", desc: "Select relative or absolute gamma", subsets: COLOR, v22: Some(RW_CNC), v30: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0x73, name: "LUT Size", desc: "Provides the size (number of entries and number of bits/entry) for the Red, Green, and Blue LUT in the display", subsets: COLOR, v20: Some(RO_T), ..BLANK },
    FeatureEntry { code: 0x74, name: "Single point LUT operation", desc: "Allows a single point within a display's color LUT to be loaded", subsets: COLOR, v20: Some(RW_T), ..BLANK },
    FeatureEntry { code: 0x75, name: "Block LUT operation", desc: "Allows a single point within a display's color LUT to be loaded", subsets: COLOR, v20: Some(RW_T), ..BLANK },
    FeatureEntry { code: 0x76, name: "Remote Procedure Call", desc: "Initiates a routine resident in the display", v20: Some(WO_T), ..BLANK },
    FeatureEntry { code: 0x78, name: "Display Identification Operation", desc: "Causes a selected 128 byte block of Display Identification Data (EDID or Display ID) to be read", v21: Some(RO_T), v30: Some(RO_T), v22: Some(RO_T), ..BLANK },
    FeatureEntry { code: 0x7a, name: "Adjust Focal Plane", desc: "Increase/decrease the distance to the focal plane of the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x7c, name: "Adjust Zoom", desc: "Increase/decrease the distance to the zoom function of the projection lens (optics)", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x7e, name: "Trapezoid", desc: "Increase/decrease the trapezoid distortion in the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x80, name: "Keystone", desc: "Increase/decrease the keystone distortion in the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x82, name: "Horizontal Mirror (Flip)", desc: "Flip picture horizontally", v20: Some(RW_SNC), v20_values: Some(MIRROR), ..BLANK },
    FeatureEntry { code: 0x84, name: "Vertical Mirror (Flip)", desc: "Flip picture vertically", v20: Some(RW_SNC), v20_values: Some(MIRROR), ..BLANK },
    FeatureEntry { code: 0x86, name: "Display Scaling", desc: "Control the scaling (input vs output) of the display", v20: Some(RW_SNC), v20_values: Some(DISPLAY_SCALING), ..BLANK },
    FeatureEntry { code: 0x87, name: "Sharpness", desc: "Specifies one of a range of algorithms", subsets: PROFILE, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x88, name: "Velocity Scan Modulation", desc: "Increase (decrease) the velocity modulation of the horizontal scan as a function of the change in luminescence level", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x8a, name: "Color Saturation", desc: "Increase/decrease the amplitude of the color difference components of the video signal", subsets: CP, v20: Some(RW_C), v30: Some(RW_CC), v22: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0x8b, name: "TV Channel Up/Down", desc: "Increment (1) or decrement (2) television channel", v20: Some(WO_NC), ..BLANK },
    FeatureEntry { code: 0x8c, name: "TV Sharpness", desc: "Increase/decrease the amplitude of high frequency components of the video signal", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x8d, name: "Audio Mute/Screen Blank", desc: "Mute/unmute audio, and (v2.2) screen blank", v20: Some(RW_SNC), v30: Some(RW_CNC), v22: Some(RW_CNC), v20_values: Some(AUDIO_MUTE), ..BLANK },
    FeatureEntry { code: 0x8e, name: "TV Contrast", desc: "Increase/decrease the ratio between blacks and whites in the image", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x8f, name: "Audio Treble", desc: "Emphasize/de-emphasize high frequency audio", v20: Some(RW_C), v30: Some(RW_NCC), v22: Some(RW_NCC), ..BLANK },
    FeatureEntry { code: 0x90, name: "Hue", desc: "Increase/decrease the wavelength of the color component of the video signal", subsets: CP, v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x91, name: "Audio Bass", desc: "Emphasize/de-emphasize low frequency audio", v20: Some(RW_C), v30: Some(RW_NCC), v22: Some(RW_NCC), ..BLANK },
    FeatureEntry { code: 0x92, name: "TV Black level/Luminesence", desc: "Increase/decrease the black level of the video", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x93, name: "Audio Balance L/R", desc: "Controls left/right audio balance", v20: Some(RW_C), v30: Some(RW_NCC), v22: Some(RW_NCC), ..BLANK },
    FeatureEntry { code: 0x94, name: "Audio Processor Mode", desc: "Select audio mode", v20: Some(RW_SNC), v20_values: Some(AUDIO_PROCESSOR_MODE), ..BLANK },
    FeatureEntry { code: 0x95, name: "Window Position(TL_X)", desc: "Top left X pixel of an area of the image", v20: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0x96, name: "Window Position(TL_Y)", desc: "Top left Y pixel of an area of the image", v20: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0x97, name: "Window Position(BR_X)", desc: "Bottom right X pixel of an area of the image", v20: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0x98, name: "Window Position(BR_Y)", desc: "Bottom right Y pixel of an area of the image", v20: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0x99, name: "Window control on/off", desc: "Enables the brightness and color within a window to be different from the desktop", v20: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0x9a, name: "Window background", desc: "Changes the contrast ratio between the area of the window and the rest of the desktop", v20: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x9b, name: "6 axis hue control: Red", desc: "Decrease shifts toward magenta, increase shifts toward yellow", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x9c, name: "6 axis hue control: Yellow", desc: "Decrease shifts toward green, increase shifts toward red", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x9d, name: "6 axis hue control: Green", desc: "Decrease shifts toward yellow, increase shifts toward cyan", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x9e, name: "6 axis hue control: Cyan", desc: "Decrease shifts toward green, increase shifts toward blue", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0x9f, name: "6 axis hue control: Blue", desc: "Decrease shifts toward cyan, increase shifts toward magenta", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0xa0, name: "6 axis hue control: Magenta", desc: "Decrease shifts toward blue, increase shifts toward red", subsets: COLOR, v21: Some(RW_C), ..BLANK },
    FeatureEntry { code: 0xa2, name: "Auto setup on/off", desc: "Turn on/off an auto setup function", v21: Some(WO_NC), v21_values: Some(ON_OFF), ..BLANK },
    FeatureEntry { code: 0xa4, name: "Turn the selected window operation on/off", desc: "Turn selected window operation on/off, window mask", v20: Some(RW_CNC), v30: Some(RW_T), v22: Some(RW_T), ..BLANK },
    FeatureEntry { code: 0xa5, name: "Change the selected window", desc: "Change selected window (as defined by 95h..98h)", v20: Some(RW_SNC), v20_values: Some(WINDOW_SELECT), ..BLANK },
    FeatureEntry { code: 0xaa, name: "Screen Orientation", desc: "Indicates screen orientation", v20: Some(RO_SNC), v20_values: Some(SCREEN_ORIENTATION), ..BLANK },
    FeatureEntry { code: 0xac, name: "Horizontal frequency", desc: "Horizontal sync signal frequency as determined by the display", v20: Some(RO_CC), ..BLANK },
    FeatureEntry { code: 0xae, name: "Vertical frequency", desc: "Vertical sync signal frequency as determined by the display", v20: Some(RO_CC), ..BLANK },
    FeatureEntry { code: 0xb0, name: "Settings", desc: "Store/restore the user saved values for the current mode", v20: Some(WO_NC), v20_values: Some(SETTINGS), ..BLANK },
    FeatureEntry { code: 0xb2, name: "Flat panel sub-pixel layout", desc: "Indicates the type of LCD sub-pixel structure", v20: Some(RO_SNC), v20_values: Some(SUBPIXEL_LAYOUT), ..BLANK },
    FeatureEntry { code: 0xb4, name: "Source Timing Mode", desc: "Indicates the timing mode being sent by the host", v22: Some(RW_CNC), v30: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0xb5, name: "Source Color Coding", desc: "Allows the host to specify the color coding method being used", v21: Some(RW_SNC), v21_values: Some(SOURCE_COLOR_CODING), ..BLANK },
    FeatureEntry { code: 0xb6, name: "Display technology type", desc: "Indicates the base technology type", v20: Some(RO_SNC), v20_values: Some(DISPLAY_TECHNOLOGY), ..BLANK },
    FeatureEntry { code: 0xb7, name: "Monitor status", desc: "Video mode and status of a DPVL capable monitor", v21: Some(RO_CNC), ..BLANK },
    FeatureEntry { code: 0xb8, name: "Packet count", desc: "Counter for DPVL packets received", v21: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0xb9, name: "Monitor X origin", desc: "X origin of the monitor in the vertical screen", v21: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0xba, name: "Monitor Y origin", desc: "Y origin of the monitor in the vertical screen", v21: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0xbb, name: "Header error count", desc: "Error counter for the DPVL header", v21: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0xbc, name: "Body CRC error count", desc: "CRC error counter for the DPVL body", v21: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0xbd, name: "Client ID", desc: "Assigned identification number for the monitor", v21: Some(RW_CC), ..BLANK },
    FeatureEntry { code: 0xbe, name: "Link control", desc: "Indicates status of the DVI link", v21: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0xc0, name: "Display usage time", desc: "Active power on time in hours", v20: Some(RO_CC), ..BLANK },
    FeatureEntry { code: 0xc2, name: "Display descriptor length", desc: "Length in bytes of non-volatile storage in the display available for writing a display descriptor, max 256", v20: Some(RO_CC), ..BLANK },
    FeatureEntry { code: 0xc3, name: "Transmit display descriptor", desc: "Reads (writes) a display descriptor from (to) non-volatile storage in the display", v20: Some(RW_T), ..BLANK },
    FeatureEntry { code: 0xc4, name: "Enable display of 'display descriptor'", desc: "If enabled, the display descriptor shall be displayed when no video is being received", v20: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0xc6, name: "Application enable key", desc: "A 2 byte value used to allow an application to only operate with known products", v20: Some(RO_CNC), ..BLANK },
    FeatureEntry { code: 0xc8, name: "Display controller type", desc: "Mfg id of controller and 2 byte manufacturer-specific controller type", v20: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0xc9, name: "Display firmware level", desc: "2 byte firmware level", v20: Some(RO_CC), ..BLANK },
    FeatureEntry { code: 0xca, name: "OSD", desc: "Is On Screen Display enabled?", v20: Some(RW_SNC), v30: Some(RW_CNC), v22: Some(RW_CNC), v20_values: Some(OSD), ..BLANK },
    FeatureEntry { code: 0xcc, name: "OSD Language", desc: "On Screen Display languages", v20: Some(RW_SNC), v20_values: Some(OSD_LANGUAGES), ..BLANK },
    FeatureEntry { code: 0xcd, name: "Status Indicators", desc: "Control up to 16 LED (or similar) indicators to indicate system status", v22: Some(RW_CNC), v30: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0xce, name: "Auxiliary display size", desc: "Rows and characters/row of auxiliary display", v20: Some(RO_CNC), ..BLANK },
    FeatureEntry { code: 0xcf, name: "Auxiliary display data", desc: "Sets contents of auxiliary display device", v20: Some(WO_T), ..BLANK },
    FeatureEntry { code: 0xd0, name: "Output select", desc: "Selects the active output", v20: Some(RW_SNC), v30: Some(RW_T), v22: Some(RW_T), v20_values: Some(INPUT_SOURCES), ..BLANK },
    FeatureEntry { code: 0xd2, name: "Asset Tag", desc: "Read an Asset Tag to/from the display", v21: Some(RW_T), ..BLANK },
    FeatureEntry { code: 0xd4, name: "Stereo video mode", desc: "Stereo video mode", v22: Some(RW_CNC), v30: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0xd6, name: "Power mode", desc: "DPM and DPMS status", v20: Some(RW_SNC), v20_values: Some(POWER_MODES), ..BLANK },
    FeatureEntry { code: 0xd7, name: "Auxiliary power output", desc: "Controls an auxiliary power output from a display to a host device", v20: Some(RW_SNC), v20_values: Some(AUX_POWER), ..BLANK },
    FeatureEntry { code: 0xda, name: "Scan mode", desc: "Controls scan characteristics (aka format)", v20: Some(RW_SNC), v20_values: Some(SCAN_MODES), ..BLANK },
    FeatureEntry { code: 0xdb, name: "Image Mode", desc: "Controls aspects of the displayed image (TV applications)", v21: Some(RW_SNC), v21_values: Some(IMAGE_MODES), ..BLANK },
    FeatureEntry { code: 0xdc, name: "Display Mode", desc: "Type of application used on display", v20: Some(RW_SNC), v30: Some(RW_SNC), v20_values: Some(DISPLAY_MODES_V20), v30_values: Some(DISPLAY_MODES_V30), ..BLANK },
    FeatureEntry { code: 0xde, name: "Scratch Pad", desc: "Operation mode (2.0) or scratch pad (3.0/2.2)", v20: Some(RW_CNC), ..BLANK },
    FeatureEntry { code: 0xdf, name: "VCP Version", desc: "MCCS version", v20: Some(RO_CNC), ..BLANK },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_unique() {
        for pair in FEATURES.windows(2) {
            assert!(pair[0].code < pair[1].code, "0x{:02x} out of order", pair[1].code);
        }
    }

    #[test]
    fn no_manufacturer_codes() {
        assert!(FEATURES.iter().all(|e| e.code < 0xe0));
    }

    #[test]
    fn lookup() {
        assert_eq!(find(0x10).map(|e| e.name), Some("Brightness"));
        assert!(find(0x07).is_none());
    }

    #[test]
    fn version_columns() {
        let e = find(0xdc).unwrap();
        let (_, v20) = e.resolve(MccsVersion::V20).unwrap();
        let (_, v30) = e.resolve(MccsVersion::V30).unwrap();
        assert_eq!(v20.unwrap().len(), 12);
        assert_eq!(v30.unwrap().len(), 8);

        // new in 2.1, absent from 2.0
        assert!(find(0x66).unwrap().resolve(MccsVersion::V20).is_none());
        assert!(find(0x66).unwrap().resolve(MccsVersion::V30).is_some());
        // 2.2/3.0 only, still reachable with an unknown version
        assert!(find(0x6b).unwrap().resolve(MccsVersion::Unknown).is_some());
    }

    #[test]
    fn mccs_10_reads_the_20_column() {
        for entry in entries() {
            let v10 = entry.resolve(MccsVersion::V10);
            let v20 = entry.resolve(MccsVersion::V20);
            assert_eq!(v10.is_some(), v20.is_some(), "0x{:02x}", entry.code);
            if let (Some((f10, _)), Some((f20, _))) = (v10, v20) {
                assert_eq!((f10.access, f10.category), (f20.access, f20.category), "0x{:02x}", entry.code);
            }
        }
    }

    #[test]
    fn value_names_resolve_in_every_version() {
        use crate::metadata::{metadata_by_version, DeprecatedPolicy};

        let versions = [
            MccsVersion::V10, MccsVersion::V20, MccsVersion::V21, MccsVersion::V22,
            MccsVersion::V30, MccsVersion::Unknown, MccsVersion::Unqueried,
        ];
        let mut checked = 0;
        for entry in entries() {
            for &version in &versions {
                let values = match entry.resolve(version) {
                    Some((_, Some(values))) => values,
                    _ => continue,
                };
                let metadata = metadata_by_version(entry.code, version, DeprecatedPolicy::Include, false).unwrap();
                for v in values {
                    assert_eq!(metadata.value_name(v.value).unwrap(), v.name,
                        "0x{:02x} value 0x{:02x} under {}", entry.code, v.value, version);
                }
                checked += 1;
            }
        }
        assert!(checked > 0);
    }
}
