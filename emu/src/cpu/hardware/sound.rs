//! The audio processing unit: two DMA-fed PCM FIFOs plus four legacy Game Boy style tone
//! channels, paced by a 512 Hz frame sequencer derived from the CPU clock.
//!
//! [`Bus::step`](crate::bus::Bus::step) drives [`Sound::step`] once per CPU cycle to advance the
//! legacy channels' frequency timers and the frame sequencer. The bus calls
//! [`Sound::on_timer_overflow`] whenever timer 0 or 1 overflows, which pops the next byte out of
//! whichever FIFO that timer drives; when a FIFO's occupancy falls to half or below, the caller
//! is told to refill it by running any DMA channel armed in special mode for that FIFO.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// Every legacy-channel period below is expressed in units of this many CPU cycles, matching
/// the ratio between the GBA's CPU clock and the original 4.194304 MHz audio clock the Game Boy
/// formulas are defined against.
const CYCLE_SCALE: u32 = 4;
const FRAME_SEQUENCER_PERIOD: u32 = 8192 * CYCLE_SCALE;
const FIFO_CAPACITY: usize = 32;
const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 0],
];
const NOISE_DIVISORS: [u32; 8] = [8, 16, 32, 48, 64, 80, 96, 112];

#[derive(Debug, Default, Serialize, Deserialize)]
struct Fifo {
    #[serde(skip)]
    queue: VecDeque<i8>,
    current_sample: i8,
}

impl Fifo {
    /// Appends one byte, dropping the oldest queued sample first if the buffer is already full.
    fn push_byte(&mut self, value: u8) {
        if self.queue.len() >= FIFO_CAPACITY {
            self.queue.pop_front();
        }
        self.queue.push_back(value as i8);
    }

    /// Decomposes `value` into four little-endian bytes and appends them in order, as a DMA
    /// word-sized transfer does.
    fn push_word(&mut self, value: u32) {
        for i in 0..4 {
            self.push_byte(value.get_byte(i));
        }
    }

    /// Pops one sample into the latched output. Returns whether occupancy is now at or below
    /// half capacity, the DMA refill threshold.
    fn advance(&mut self) -> bool {
        if let Some(sample) = self.queue.pop_front() {
            self.current_sample = sample;
        }
        self.queue.len() <= FIFO_CAPACITY / 2
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
struct Envelope {
    initial_volume: u8,
    increasing: bool,
    period: u8,
    timer: u8,
    volume: u8,
}

impl Envelope {
    fn write_control(&mut self, nrx2: u16) {
        self.initial_volume = ((nrx2 >> 4) & 0xF) as u8;
        self.increasing = nrx2 & 0x08 != 0;
        self.period = (nrx2 & 0x07) as u8;
    }

    const fn dac_enabled(nrx2: u16) -> bool {
        nrx2 & 0xF8 != 0
    }

    fn trigger(&mut self) {
        self.volume = self.initial_volume;
        self.timer = if self.period == 0 { 8 } else { self.period };
    }

    fn clock(&mut self) {
        if self.period == 0 {
            return;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.timer = self.period;
            if self.increasing {
                self.volume = (self.volume + 1).min(15);
            } else {
                self.volume = self.volume.saturating_sub(1);
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
struct Sweep {
    shadow_frequency: u16,
    period: u8,
    timer: u8,
    negate: bool,
    shift: u8,
    enabled: bool,
}

impl Sweep {
    fn write_control(&mut self, nr10: u16) {
        self.period = ((nr10 >> 4) & 0x07) as u8;
        self.negate = nr10 & 0x08 != 0;
        self.shift = (nr10 & 0x07) as u8;
    }

    fn trigger(&mut self, frequency: u16) {
        self.shadow_frequency = frequency;
        self.timer = if self.period == 0 { 8 } else { self.period };
        self.enabled = self.period != 0 || self.shift != 0;
    }

    fn target_frequency(&self) -> u16 {
        let delta = self.shadow_frequency >> self.shift;
        if self.negate {
            self.shadow_frequency.saturating_sub(delta)
        } else {
            self.shadow_frequency.saturating_add(delta)
        }
    }

    /// Clocks the sweep unit. Returns `(new_frequency, disable_channel)`: a fresh shadow
    /// frequency when the shift updates it, and whether an overflow past 2047 should silence
    /// the owning channel.
    fn clock(&mut self) -> (Option<u16>, bool) {
        if !self.enabled || self.period == 0 {
            return (None, false);
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer != 0 {
            return (None, false);
        }
        self.timer = self.period;
        if self.shift == 0 {
            return (None, false);
        }
        let target = self.target_frequency();
        if target > 2047 {
            self.enabled = false;
            return (None, true);
        }
        self.shadow_frequency = target;
        (Some(target), false)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SquareChannel {
    enabled: bool,
    dac_enabled: bool,
    duty: u8,
    duty_phase: u8,
    frequency: u16,
    timer: i32,
    length_counter: u16,
    length_enabled: bool,
    envelope: Envelope,
    sweep: Option<Sweep>,
}

impl SquareChannel {
    fn period(&self) -> i32 {
        (2048 - i32::from(self.frequency)) * 4 * CYCLE_SCALE as i32
    }

    fn write_duty_length_envelope(&mut self, value: u16) {
        self.duty = ((value >> 6) & 0b11) as u8;
        self.length_counter = 64 - (value & 0x3F);
        self.envelope.write_control(value);
        self.dac_enabled = Envelope::dac_enabled(value);
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    fn write_frequency_control(&mut self, value: u16) {
        self.frequency = value & 0x07FF;
        self.length_enabled = value & 0x4000 != 0;
        if value & 0x8000 != 0 {
            self.trigger();
        }
    }

    fn trigger(&mut self) {
        if self.length_counter == 0 {
            self.length_counter = 64;
        }
        self.timer = self.period();
        self.envelope.trigger();
        if let Some(sweep) = &mut self.sweep {
            sweep.trigger(self.frequency);
            if sweep.shift != 0 && sweep.target_frequency() > 2047 {
                self.enabled = false;
                return;
            }
        }
        self.enabled = self.dac_enabled;
    }

    fn step(&mut self, cycles: u32) {
        if !self.enabled {
            return;
        }
        self.timer -= cycles as i32;
        while self.timer <= 0 {
            self.timer += self.period().max(1);
            self.duty_phase = (self.duty_phase + 1) % 8;
        }
    }

    fn clock_length(&mut self) {
        if self.length_enabled && self.length_counter > 0 {
            self.length_counter -= 1;
            if self.length_counter == 0 {
                self.enabled = false;
            }
        }
    }

    fn clock_sweep(&mut self) {
        let Some(sweep) = &mut self.sweep else { return };
        let (new_frequency, disable) = sweep.clock();
        if let Some(new_frequency) = new_frequency {
            self.frequency = new_frequency;
        }
        if disable {
            self.enabled = false;
        }
    }

    fn amplitude(&self) -> i16 {
        if !self.enabled || !self.dac_enabled {
            return 0;
        }
        let bit = DUTY_TABLE[self.duty as usize][self.duty_phase as usize];
        if bit == 1 {
            i16::from(self.envelope.volume)
        } else {
            -i16::from(self.envelope.volume)
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WaveChannel {
    enabled: bool,
    dac_enabled: bool,
    position: u8,
    frequency: u16,
    timer: i32,
    length_counter: u16,
    length_enabled: bool,
    volume_code: u8,
    ram: [u8; 16],
}

impl WaveChannel {
    fn period(&self) -> i32 {
        (2048 - i32::from(self.frequency)) * 2 * CYCLE_SCALE as i32
    }

    fn write_stop_select(&mut self, value: u16) {
        self.dac_enabled = value & 0x80 != 0;
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    fn write_length_volume(&mut self, value: u16) {
        self.length_counter = 256 - (value & 0xFF);
        self.volume_code = ((value >> 13) & 0b11) as u8;
    }

    fn write_frequency_control(&mut self, value: u16) {
        self.frequency = value & 0x07FF;
        self.length_enabled = value & 0x4000 != 0;
        if value & 0x8000 != 0 {
            self.trigger();
        }
    }

    fn trigger(&mut self) {
        if self.length_counter == 0 {
            self.length_counter = 256;
        }
        self.timer = self.period();
        self.position = 0;
        self.enabled = self.dac_enabled;
    }

    fn step(&mut self, cycles: u32) {
        if !self.enabled {
            return;
        }
        self.timer -= cycles as i32;
        while self.timer <= 0 {
            self.timer += self.period().max(1);
            self.position = (self.position + 1) % 32;
        }
    }

    fn clock_length(&mut self) {
        if self.length_enabled && self.length_counter > 0 {
            self.length_counter -= 1;
            if self.length_counter == 0 {
                self.enabled = false;
            }
        }
    }

    fn current_sample_nibble(&self) -> u8 {
        let byte = self.ram[(self.position / 2) as usize];
        if self.position % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }

    fn amplitude(&self) -> i16 {
        if !self.enabled || !self.dac_enabled {
            return 0;
        }
        let sample = i16::from(self.current_sample_nibble()) - 8;
        let shift = match self.volume_code {
            0 => return 0,
            1 => 0,
            2 => 1,
            _ => 2,
        };
        sample >> shift
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NoiseChannel {
    enabled: bool,
    dac_enabled: bool,
    length_counter: u16,
    length_enabled: bool,
    envelope: Envelope,
    lfsr: u16,
    divisor_code: u8,
    shift_clock: u8,
    narrow_mode: bool,
    timer: i32,
}

impl NoiseChannel {
    fn period(&self) -> i32 {
        (NOISE_DIVISORS[self.divisor_code as usize] << self.shift_clock) as i32
            * CYCLE_SCALE as i32
    }

    fn write_length_envelope(&mut self, value: u16) {
        self.length_counter = 64 - (value & 0x3F);
        self.envelope.write_control(value);
        self.dac_enabled = Envelope::dac_enabled(value);
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    fn write_frequency_control(&mut self, value: u16) {
        self.divisor_code = (value & 0x07) as u8;
        self.narrow_mode = value & 0x08 != 0;
        self.shift_clock = ((value >> 4) & 0x0F) as u8;
        self.length_enabled = value & 0x4000 != 0;
        if value & 0x8000 != 0 {
            self.trigger();
        }
    }

    fn trigger(&mut self) {
        if self.length_counter == 0 {
            self.length_counter = 64;
        }
        self.timer = self.period();
        self.lfsr = 0x7FFF;
        self.envelope.trigger();
        self.enabled = self.dac_enabled;
    }

    fn step(&mut self, cycles: u32) {
        if !self.enabled {
            return;
        }
        self.timer -= cycles as i32;
        while self.timer <= 0 {
            self.timer += self.period().max(1);
            let feedback = (self.lfsr & 1) ^ ((self.lfsr >> 1) & 1);
            self.lfsr = (self.lfsr >> 1) | (feedback << 14);
            if self.narrow_mode {
                self.lfsr = (self.lfsr & !(1 << 6)) | (feedback << 6);
            }
        }
    }

    fn clock_length(&mut self) {
        if self.length_enabled && self.length_counter > 0 {
            self.length_counter -= 1;
            if self.length_counter == 0 {
                self.enabled = false;
            }
        }
    }

    fn amplitude(&self) -> i16 {
        if !self.enabled || !self.dac_enabled {
            return 0;
        }
        if self.lfsr & 1 == 0 {
            i16::from(self.envelope.volume)
        } else {
            -i16::from(self.envelope.volume)
        }
    }
}

/// Eight-step 512 Hz sequencer that clocks length counters, sweep, and envelopes on specific
/// steps, matching the original Game Boy frame sequencer's schedule.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FrameSequencer {
    step: u8,
    remaining: u32,
}

impl FrameSequencer {
    fn advance(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            self.remaining = FRAME_SEQUENCER_PERIOD;
        }
        self.remaining -= 1;
        if self.remaining != 0 {
            return None;
        }
        self.remaining = FRAME_SEQUENCER_PERIOD;
        let step = self.step;
        self.step = (self.step + 1) % 8;
        Some(step)
    }
}

#[derive(Default, Serialize, Deserialize)]
pub struct Sound {
    channel1: SquareChannel,
    channel2: SquareChannel,
    channel3: WaveChannel,
    channel4: NoiseChannel,
    sequencer: FrameSequencer,

    fifo_a: Fifo,
    fifo_b: Fifo,

    control_stereo_volume_enable: u16,
    control_mixing_dma_control: u16,
    control_sound_on_off: u16,
    sound_pwm_control: u16,
}

impl Sound {
    /// Pushes one DMA-sourced word into the named FIFO, used by special-mode DMA channels 1/2.
    pub fn push_fifo_word(&mut self, fifo_num: u8, value: u32) {
        match fifo_num {
            0 => self.fifo_a.push_word(value),
            _ => self.fifo_b.push_word(value),
        }
    }

    /// Called whenever timer 0 or 1 overflows. Advances whichever FIFO is configured to use
    /// that timer and returns which FIFOs, if any, dropped to half occupancy and need a DMA
    /// refill.
    pub fn on_timer_overflow(&mut self, timer_idx: u8) -> [bool; 2] {
        let mut needs_refill = [false, false];
        let fifo_a_timer = u8::from(self.control_mixing_dma_control & 0x0400 != 0);
        let fifo_b_timer = u8::from(self.control_mixing_dma_control & 0x4000 != 0);
        if fifo_a_timer == timer_idx {
            needs_refill[0] = self.fifo_a.advance();
        }
        if fifo_b_timer == timer_idx {
            needs_refill[1] = self.fifo_b.advance();
        }
        needs_refill
    }

    /// Advances the legacy channels' frequency timers by one CPU cycle and clocks the frame
    /// sequencer, in turn clocking length/sweep/envelope on the appropriate steps.
    pub fn step(&mut self) {
        self.channel1.step(1);
        self.channel2.step(1);
        self.channel3.step(1);
        self.channel4.step(1);

        if let Some(step) = self.sequencer.advance() {
            if step % 2 == 0 {
                self.channel1.clock_length();
                self.channel2.clock_length();
                self.channel3.clock_length();
                self.channel4.clock_length();
            }
            if step == 2 || step == 6 {
                self.channel1.clock_sweep();
            }
            if step == 7 {
                self.channel1.envelope.clock();
                self.channel2.envelope.clock();
                self.channel4.envelope.clock();
            }
        }
    }

    /// Mixes the four legacy channels and both FIFOs into a stereo sample, honoring per-channel
    /// pan and the master/FIFO volume controls in `SOUNDCNT_L`/`SOUNDCNT_H`.
    #[must_use]
    pub fn mix(&self) -> (i16, i16) {
        if self.control_sound_on_off & 0x80 == 0 {
            return (0, 0);
        }

        let legacy = [
            self.channel1.amplitude(),
            self.channel2.amplitude(),
            self.channel3.amplitude(),
            self.channel4.amplitude(),
        ];
        let left_vol = i16::from((self.control_stereo_volume_enable >> 4) & 0x07);
        let right_vol = i16::from(self.control_stereo_volume_enable & 0x07);

        let mut left = 0i32;
        let mut right = 0i32;
        for (idx, amp) in legacy.iter().enumerate() {
            if self.control_stereo_volume_enable & (0x1000 << idx) != 0 {
                left += i32::from(*amp) * i32::from(left_vol);
            }
            if self.control_stereo_volume_enable & (0x0100 << idx) != 0 {
                right += i32::from(*amp) * i32::from(right_vol);
            }
        }

        let fifo_shift = if self.control_mixing_dma_control & 0x0004 != 0 { 0 } else { 1 };
        let fifo_a = i32::from(self.fifo_a.current_sample) << (2 - fifo_shift);
        let fifo_b = i32::from(self.fifo_b.current_sample) << (2 - fifo_shift);

        if self.control_mixing_dma_control & 0x0100 != 0 {
            left += fifo_a;
        }
        if self.control_mixing_dma_control & 0x0200 != 0 {
            right += fifo_a;
        }
        if self.control_mixing_dma_control & 0x1000 != 0 {
            left += fifo_b;
        }
        if self.control_mixing_dma_control & 0x2000 != 0 {
            right += fifo_b;
        }

        (
            i16::try_from(left.clamp(-32768, 32767)).unwrap_or(i16::MAX),
            i16::try_from(right.clamp(-32768, 32767)).unwrap_or(i16::MAX),
        )
    }

    #[must_use]
    pub fn read_register(&self, address: usize) -> u8 {
        match address {
            0x0400_0060 => self.channel1_sweep_reg().get_byte(0),
            0x0400_0061 => self.channel1_sweep_reg().get_byte(1),
            0x0400_0062 => self.channel1_duty_length_envelope_reg().get_byte(0),
            0x0400_0063 => self.channel1_duty_length_envelope_reg().get_byte(1),
            0x0400_0064 => self.channel1_frequency_control_reg().get_byte(0),
            0x0400_0065 => self.channel1_frequency_control_reg().get_byte(1),
            0x0400_0068 => self.channel2_duty_length_envelope_reg().get_byte(0),
            0x0400_0069 => self.channel2_duty_length_envelope_reg().get_byte(1),
            0x0400_006C => self.channel2_frequency_control_reg().get_byte(0),
            0x0400_006D => self.channel2_frequency_control_reg().get_byte(1),
            0x0400_0070 => self.channel3_stop_select_reg().get_byte(0),
            0x0400_0071 => self.channel3_stop_select_reg().get_byte(1),
            0x0400_0072 => self.channel3_length_volume_reg().get_byte(0),
            0x0400_0073 => self.channel3_length_volume_reg().get_byte(1),
            0x0400_0074 => self.channel3_frequency_control_reg().get_byte(0),
            0x0400_0075 => self.channel3_frequency_control_reg().get_byte(1),
            0x0400_0078 => self.channel4_length_envelope_reg().get_byte(0),
            0x0400_0079 => self.channel4_length_envelope_reg().get_byte(1),
            0x0400_007C => self.channel4_frequency_control_reg().get_byte(0),
            0x0400_007D => self.channel4_frequency_control_reg().get_byte(1),
            0x0400_0080 => self.control_stereo_volume_enable.get_byte(0),
            0x0400_0081 => self.control_stereo_volume_enable.get_byte(1),
            0x0400_0082 => self.control_mixing_dma_control.get_byte(0),
            0x0400_0083 => self.control_mixing_dma_control.get_byte(1),
            0x0400_0084 => self.control_sound_on_off.get_byte(0),
            0x0400_0085 => self.control_sound_on_off.get_byte(1),
            0x0400_0088 => self.sound_pwm_control.get_byte(0),
            0x0400_0089 => self.sound_pwm_control.get_byte(1),
            0x0400_0090..=0x0400_009F => self.channel3.ram[address - 0x0400_0090],
            // The FIFO registers are write-only on real hardware.
            0x0400_00A0..=0x0400_00A7 => 0,
            _ => 0,
        }
    }

    pub fn write_register(&mut self, address: usize, value: u8) {
        let set_low = |current: u16| -> u16 {
            let mut v = current;
            v.set_byte(0, value);
            v
        };
        let set_high = |current: u16| -> u16 {
            let mut v = current;
            v.set_byte(1, value);
            v
        };

        match address {
            0x0400_0060 => {
                let mut v = self.channel1_sweep_reg();
                v.set_byte(0, value);
                self.channel1.sweep.get_or_insert_with(Sweep::default).write_control(v);
            }
            0x0400_0061 => {
                let mut v = self.channel1_sweep_reg();
                v.set_byte(1, value);
                self.channel1.sweep.get_or_insert_with(Sweep::default).write_control(v);
            }
            0x0400_0062 => {
                let v = set_low(self.channel1_duty_length_envelope_reg());
                self.channel1.write_duty_length_envelope(v);
            }
            0x0400_0063 => {
                let v = set_high(self.channel1_duty_length_envelope_reg());
                self.channel1.write_duty_length_envelope(v);
            }
            0x0400_0064 => {
                let v = set_low(self.channel1_frequency_control_reg());
                self.channel1.write_frequency_control(v);
            }
            0x0400_0065 => {
                let v = set_high(self.channel1_frequency_control_reg());
                self.channel1.write_frequency_control(v);
            }
            0x0400_0068 => {
                let v = set_low(self.channel2_duty_length_envelope_reg());
                self.channel2.write_duty_length_envelope(v);
            }
            0x0400_0069 => {
                let v = set_high(self.channel2_duty_length_envelope_reg());
                self.channel2.write_duty_length_envelope(v);
            }
            0x0400_006C => {
                let v = set_low(self.channel2_frequency_control_reg());
                self.channel2.write_frequency_control(v);
            }
            0x0400_006D => {
                let v = set_high(self.channel2_frequency_control_reg());
                self.channel2.write_frequency_control(v);
            }
            0x0400_0070 => {
                let v = set_low(self.channel3_stop_select_reg());
                self.channel3.write_stop_select(v);
            }
            0x0400_0071 => {
                let v = set_high(self.channel3_stop_select_reg());
                self.channel3.write_stop_select(v);
            }
            0x0400_0072 => {
                let v = set_low(self.channel3_length_volume_reg());
                self.channel3.write_length_volume(v);
            }
            0x0400_0073 => {
                let v = set_high(self.channel3_length_volume_reg());
                self.channel3.write_length_volume(v);
            }
            0x0400_0074 => {
                let v = set_low(self.channel3_frequency_control_reg());
                self.channel3.write_frequency_control(v);
            }
            0x0400_0075 => {
                let v = set_high(self.channel3_frequency_control_reg());
                self.channel3.write_frequency_control(v);
            }
            0x0400_0078 => {
                let v = set_low(self.channel4_length_envelope_reg());
                self.channel4.write_length_envelope(v);
            }
            0x0400_0079 => {
                let v = set_high(self.channel4_length_envelope_reg());
                self.channel4.write_length_envelope(v);
            }
            0x0400_007C => {
                let v = set_low(self.channel4_frequency_control_reg());
                self.channel4.write_frequency_control(v);
            }
            0x0400_007D => {
                let v = set_high(self.channel4_frequency_control_reg());
                self.channel4.write_frequency_control(v);
            }
            0x0400_0080 => self.control_stereo_volume_enable.set_byte(0, value),
            0x0400_0081 => self.control_stereo_volume_enable.set_byte(1, value),
            0x0400_0082 => self.control_mixing_dma_control.set_byte(0, value),
            0x0400_0083 => self.control_mixing_dma_control.set_byte(1, value),
            0x0400_0084 => self.control_sound_on_off.set_byte(0, value),
            0x0400_0085 => self.control_sound_on_off.set_byte(1, value),
            0x0400_0088 => self.sound_pwm_control.set_byte(0, value),
            0x0400_0089 => self.sound_pwm_control.set_byte(1, value),
            0x0400_0090..=0x0400_009F => self.channel3.ram[address - 0x0400_0090] = value,
            0x0400_00A0..=0x0400_00A3 => self.fifo_a.push_byte(value),
            0x0400_00A4..=0x0400_00A7 => self.fifo_b.push_byte(value),
            _ => {}
        }
    }

    fn channel1_sweep_reg(&self) -> u16 {
        let sweep = self.channel1.sweep.unwrap_or_default();
        (u16::from(sweep.period) << 4) | (u16::from(sweep.negate) << 3) | u16::from(sweep.shift)
    }

    fn channel1_duty_length_envelope_reg(&self) -> u16 {
        Self::duty_length_envelope_reg(&self.channel1)
    }

    fn channel2_duty_length_envelope_reg(&self) -> u16 {
        Self::duty_length_envelope_reg(&self.channel2)
    }

    fn duty_length_envelope_reg(channel: &SquareChannel) -> u16 {
        (u16::from(channel.duty) << 6)
            | (64 - channel.length_counter)
            | (u16::from(channel.envelope.initial_volume) << 12)
            | (u16::from(channel.envelope.increasing) << 11)
            | u16::from(channel.envelope.period)
    }

    fn channel1_frequency_control_reg(&self) -> u16 {
        Self::frequency_control_reg(self.channel1.frequency, self.channel1.length_enabled)
    }

    fn channel2_frequency_control_reg(&self) -> u16 {
        Self::frequency_control_reg(self.channel2.frequency, self.channel2.length_enabled)
    }

    fn frequency_control_reg(frequency: u16, length_enabled: bool) -> u16 {
        frequency | (u16::from(length_enabled) << 14)
    }

    fn channel3_stop_select_reg(&self) -> u16 {
        u16::from(self.channel3.dac_enabled) << 7
    }

    fn channel3_length_volume_reg(&self) -> u16 {
        (256 - self.channel3.length_counter) | (u16::from(self.channel3.volume_code) << 13)
    }

    fn channel3_frequency_control_reg(&self) -> u16 {
        Self::frequency_control_reg(self.channel3.frequency, self.channel3.length_enabled)
    }

    fn channel4_length_envelope_reg(&self) -> u16 {
        (64 - self.channel4.length_counter)
            | (u16::from(self.channel4.envelope.initial_volume) << 12)
            | (u16::from(self.channel4.envelope.increasing) << 11)
            | u16::from(self.channel4.envelope.period)
    }

    fn channel4_frequency_control_reg(&self) -> u16 {
        u16::from(self.channel4.divisor_code)
            | (u16::from(self.channel4.narrow_mode) << 3)
            | (u16::from(self.channel4.shift_clock) << 4)
            | (u16::from(self.channel4.length_enabled) << 14)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_push_drops_oldest_on_overflow() {
        let mut fifo = Fifo::default();
        for i in 0..10u32 {
            fifo.push_word(i);
        }
        assert_eq!(fifo.queue.len(), FIFO_CAPACITY);
    }

    #[test]
    fn fifo_reports_refill_needed_at_half_occupancy() {
        let mut fifo = Fifo::default();
        fifo.push_word(0x0102_0304);
        fifo.push_word(0x0506_0708);
        fifo.push_word(0x090A_0B0C);
        fifo.push_word(0x0D0E_0F10);
        for _ in 0..8 {
            assert!(!fifo.advance());
        }
    }

    #[test]
    fn square_trigger_resets_length_and_envelope() {
        let mut sound = Sound::default();
        sound.write_register(0x0400_0062, 0b1111_0000); // initial volume 15
        sound.write_register(0x0400_0063, 0);
        sound.write_register(0x0400_0065, 0x80); // trigger bit
        assert!(sound.channel1.enabled);
        assert_eq!(sound.channel1.envelope.volume, 15);
    }

    #[test]
    fn frame_sequencer_cycles_through_eight_steps() {
        let mut seq = FrameSequencer::default();
        let mut steps = vec![];
        for _ in 0..(FRAME_SEQUENCER_PERIOD * 9) {
            if let Some(step) = seq.advance() {
                steps.push(step);
            }
        }
        assert_eq!(steps, vec![0, 1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn on_timer_overflow_only_advances_selected_fifo() {
        let mut sound = Sound::default();
        sound.control_mixing_dma_control = 0; // both FIFOs use timer 0
        sound.push_fifo_word(0, 0x0102_0304);
        let refill = sound.on_timer_overflow(1);
        assert_eq!(refill, [false, false]);
        let refill = sound.on_timer_overflow(0);
        assert!(!refill[0]);
    }

    #[test]
    fn master_disable_silences_mix_output() {
        let mut sound = Sound::default();
        sound.control_sound_on_off = 0;
        assert_eq!(sound.mix(), (0, 0));
    }
}
