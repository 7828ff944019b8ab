//! Actuation sink. The zone decides when; the implementor touches hardware.

pub trait Actuator {
    fn set_actuator(&mut self, on: bool);
}

impl<F: FnMut(bool)> Actuator for F {
    fn set_actuator(&mut self, on: bool) {
        self(on)
    }
}
