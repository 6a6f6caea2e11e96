//! DualSense effects-state output record.
//!
//! Layout reference: <https://controllers.fandom.com/wiki/Sony_DualSense#FFB_Trigger_Modes>

/// Size of the serialized record in bytes.
pub const DS5_EFFECTS_LEN: usize = 47;

/// Length of one adaptive-trigger effect parameter block.
pub const TRIGGER_EFFECT_LEN: usize = 11;

/// Trigger effect block that switches the effect off.
pub const TRIGGER_EFFECT_OFF: [u8; TRIGGER_EFFECT_LEN] = [0x05, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

/// Byte offsets of every field in the serialized record.
pub mod offset {
    pub const ENABLE_BITS1: usize = 0;
    pub const ENABLE_BITS2: usize = 1;
    pub const RUMBLE_RIGHT: usize = 2;
    pub const RUMBLE_LEFT: usize = 3;
    pub const HEADPHONE_VOLUME: usize = 4;
    pub const SPEAKER_VOLUME: usize = 5;
    pub const MICROPHONE_VOLUME: usize = 6;
    pub const AUDIO_ENABLE_BITS: usize = 7;
    pub const MIC_LIGHT_MODE: usize = 8;
    pub const AUDIO_MUTE_BITS: usize = 9;
    pub const RIGHT_TRIGGER_EFFECT: usize = 10;
    pub const LEFT_TRIGGER_EFFECT: usize = 21;
    pub const UNKNOWN1: usize = 32;
    pub const LED_FLAGS: usize = 38;
    pub const UNKNOWN2: usize = 39;
    pub const LED_ANIM: usize = 41;
    pub const LED_BRIGHTNESS: usize = 42;
    pub const PAD_LIGHTS: usize = 43;
    pub const LED_RED: usize = 44;
    pub const LED_GREEN: usize = 45;
    pub const LED_BLUE: usize = 46;
}

/// Output state accepted by DualSense controllers through the raw effect channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ds5EffectsState {
    pub enable_bits1: u8,
    pub enable_bits2: u8,
    pub rumble_right: u8,
    pub rumble_left: u8,
    pub headphone_volume: u8,
    pub speaker_volume: u8,
    pub microphone_volume: u8,
    pub audio_enable_bits: u8,
    pub mic_light_mode: u8,
    pub audio_mute_bits: u8,
    pub right_trigger_effect: [u8; TRIGGER_EFFECT_LEN],
    pub left_trigger_effect: [u8; TRIGGER_EFFECT_LEN],
    pub unknown1: [u8; 6],
    pub led_flags: u8,
    pub unknown2: [u8; 2],
    pub led_anim: u8,
    pub led_brightness: u8,
    pub pad_lights: u8,
    pub led_red: u8,
    pub led_green: u8,
    pub led_blue: u8,
}

impl Ds5EffectsState {
    /// `enable_bits1` flag: apply `right_trigger_effect`.
    pub const MODIFY_RIGHT_TRIGGER: u8 = 0x04;
    /// `enable_bits1` flag: apply `left_trigger_effect`.
    pub const MODIFY_LEFT_TRIGGER: u8 = 0x08;

    /// Command that turns off any effect left on both adaptive triggers.
    pub fn clear_triggers() -> Self {
        Self {
            enable_bits1: Self::MODIFY_RIGHT_TRIGGER | Self::MODIFY_LEFT_TRIGGER,
            right_trigger_effect: TRIGGER_EFFECT_OFF,
            left_trigger_effect: TRIGGER_EFFECT_OFF,
            ..Self::default()
        }
    }

    pub fn to_bytes(&self) -> [u8; DS5_EFFECTS_LEN] {
        let mut out = [0u8; DS5_EFFECTS_LEN];
        out[offset::ENABLE_BITS1] = self.enable_bits1;
        out[offset::ENABLE_BITS2] = self.enable_bits2;
        out[offset::RUMBLE_RIGHT] = self.rumble_right;
        out[offset::RUMBLE_LEFT] = self.rumble_left;
        out[offset::HEADPHONE_VOLUME] = self.headphone_volume;
        out[offset::SPEAKER_VOLUME] = self.speaker_volume;
        out[offset::MICROPHONE_VOLUME] = self.microphone_volume;
        out[offset::AUDIO_ENABLE_BITS] = self.audio_enable_bits;
        out[offset::MIC_LIGHT_MODE] = self.mic_light_mode;
        out[offset::AUDIO_MUTE_BITS] = self.audio_mute_bits;
        write_block(&mut out, offset::RIGHT_TRIGGER_EFFECT, &self.right_trigger_effect);
        write_block(&mut out, offset::LEFT_TRIGGER_EFFECT, &self.left_trigger_effect);
        write_block(&mut out, offset::UNKNOWN1, &self.unknown1);
        out[offset::LED_FLAGS] = self.led_flags;
        write_block(&mut out, offset::UNKNOWN2, &self.unknown2);
        out[offset::LED_ANIM] = self.led_anim;
        out[offset::LED_BRIGHTNESS] = self.led_brightness;
        out[offset::PAD_LIGHTS] = self.pad_lights;
        out[offset::LED_RED] = self.led_red;
        out[offset::LED_GREEN] = self.led_green;
        out[offset::LED_BLUE] = self.led_blue;
        out
    }
}

#[inline]
fn write_block(out: &mut [u8], at: usize, block: &[u8]) {
    out[at..at + block.len()].copy_from_slice(block);
}
