use std::fmt;

use crate::rules::status::StatusKind;
use crate::rules::transformation::TransformationKind;
use crate::simulation::combat::CombatEvent;

/// Banner-style flourish printed above a combat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualEffect {
    CriticalFlash,
    ShieldShimmer,
    AfterImage,
    CounterSpark,
    EnergySurge,
    Fade,
    DomainExpansion,
    Collapse,
}

impl VisualEffect {
    pub fn banner(self) -> &'static str {
        match self {
            VisualEffect::CriticalFlash => "*** CRITICAL ***",
            VisualEffect::ShieldShimmer => "~ the barrier ripples ~",
            VisualEffect::AfterImage => ">> after-image <<",
            VisualEffect::CounterSpark => "!! COUNTER !!",
            VisualEffect::EnergySurge => "=== CURSED ENERGY SURGES ===",
            VisualEffect::Fade => "... the aura fades ...",
            VisualEffect::DomainExpansion => "### DOMAIN EXPANSION ###",
            VisualEffect::Collapse => "--- X ---",
        }
    }
}

impl fmt::Display for VisualEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.banner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Impact,
    HeavyImpact,
    Whoosh,
    Clang,
    Sizzle,
    Chime,
    Roar,
    Heartbeat,
    Footsteps,
}

impl SoundCue {
    pub fn label(self) -> &'static str {
        match self {
            SoundCue::Impact => "thud",
            SoundCue::HeavyImpact => "bone-deep crack",
            SoundCue::Whoosh => "whoosh",
            SoundCue::Clang => "clang",
            SoundCue::Sizzle => "sizzle",
            SoundCue::Chime => "soft chime",
            SoundCue::Roar => "roar of cursed energy",
            SoundCue::Heartbeat => "slowing heartbeat",
            SoundCue::Footsteps => "running footsteps",
        }
    }
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[SFX: {}]", self.label())
    }
}

/// Visual and audio flavour for a combat event. Either side may be empty.
pub fn effects_for(event: &CombatEvent) -> (Option<VisualEffect>, Option<SoundCue>) {
    match event {
        CombatEvent::Hit { critical: true, .. } => (Some(VisualEffect::CriticalFlash), Some(SoundCue::HeavyImpact)),
        CombatEvent::Hit { absorbed, .. } if *absorbed > 0 => {
            (Some(VisualEffect::ShieldShimmer), Some(SoundCue::Clang))
        }
        CombatEvent::Hit { .. } => (None, Some(SoundCue::Impact)),
        CombatEvent::Dodged { .. } => (Some(VisualEffect::AfterImage), Some(SoundCue::Whoosh)),
        CombatEvent::Countered { .. } => (Some(VisualEffect::CounterSpark), Some(SoundCue::Impact)),
        CombatEvent::Guarding { .. } => (None, Some(SoundCue::Clang)),
        CombatEvent::StatusDamage { kind, .. } => match kind {
            StatusKind::Burn | StatusKind::Poison => (None, Some(SoundCue::Sizzle)),
            _ => (None, None),
        },
        CombatEvent::Regenerated { .. } | CombatEvent::ItemUsed { .. } => (None, Some(SoundCue::Chime)),
        CombatEvent::Transformed { kind, .. } => {
            let visual = if *kind == TransformationKind::DomainAwakening {
                VisualEffect::DomainExpansion
            } else {
                VisualEffect::EnergySurge
            };
            (Some(visual), Some(SoundCue::Roar))
        }
        CombatEvent::TransformationEnded { .. } => (Some(VisualEffect::Fade), None),
        CombatEvent::Fled { .. } => (None, Some(SoundCue::Footsteps)),
        CombatEvent::Defeated { .. } | CombatEvent::SpareBreath { .. } => {
            (Some(VisualEffect::Collapse), Some(SoundCue::Heartbeat))
        }
        _ => (None, None),
    }
}

/// Print-ready lines for one event: banner, text, then the cue.
pub fn render_event(event: &CombatEvent) -> Vec<String> {
    let (visual, sound) = effects_for(event);
    let mut lines = Vec::new();
    if let Some(visual) = visual {
        lines.push(visual.to_string());
    }
    let mut text = event.to_string();
    if let Some(sound) = sound {
        text.push(' ');
        text.push_str(&sound.to_string());
    }
    lines.push(text);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_hits_get_a_banner_and_a_cue() {
        let event = CombatEvent::Hit {
            attacker: "Yuji".into(),
            target: "Curse".into(),
            technique: None,
            amount: 30,
            critical: true,
            absorbed: 0,
        };
        let lines = render_event(&event);
        assert_eq!(lines[0], "*** CRITICAL ***");
        assert!(lines[1].ends_with("[SFX: bone-deep crack]"));
    }

    #[test]
    fn quiet_events_render_as_plain_text() {
        let event = CombatEvent::Stunned { name: "Rin".into() };
        assert_eq!(effects_for(&event), (None, None));
        assert_eq!(render_event(&event), vec![event.to_string()]);
    }
}
