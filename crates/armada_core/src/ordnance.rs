//! Sub-entity lifecycle: projectiles, missiles, mines and collectables.
//!
//! Each pass walks its registry in id order, takes one entry out, advances
//! it and either puts it back or lets it go. An entity spawned earlier in
//! the same tick is advanced in the same tick.

use crate::combat::{Affects, TickContext};
use crate::components::{EntityId, Missile, Projectile};
use crate::data::{ArmamentBehavior, MineEffect, MissileEffect, Reward};
use crate::delayed::DelayedEffect;
use crate::effects::{Anchor, EffectId};
use crate::math::{circles_overlap, rotate_toward, Fixed, Vec2Fixed};

/// Advance every live projectile one tick.
pub(crate) fn advance_projectiles(ctx: &mut TickContext<'_>) {
    for id in ctx.world.projectiles.sorted_ids() {
        let Some(mut projectile) = ctx.world.projectiles.remove(id) else {
            continue;
        };
        projectile.position += Vec2Fixed::from_angle(projectile.heading, projectile.speed);
        projectile.frames_left = projectile.frames_left.saturating_sub(1);

        let hit = ctx
            .world
            .units
            .iter_sorted()
            .find(|(_, unit)| {
                unit.is_operable()
                    && unit.team != projectile.team
                    && circles_overlap(
                        projectile.position,
                        projectile.radius,
                        unit.position,
                        unit.radius,
                    )
            })
            .map(|(unit_id, _)| unit_id);

        if let Some(target) = hit {
            ctx.damage_unit(target, projectile.damage, projectile.parent);
            ctx.out.trigger(
                EffectId::PROJECTILE_HIT,
                Anchor::at(projectile.position, projectile.heading),
                Some(Anchor::Player(target)),
            );
            burst(ctx, &projectile);
        } else if projectile.frames_left == 0 {
            burst(ctx, &projectile);
        } else {
            ctx.world.projectiles.insert(id, projectile);
        }
    }
}

/// End-of-life area burst for cannons that carry one.
fn burst(ctx: &mut TickContext<'_>, projectile: &Projectile) {
    let catalog = ctx.catalog;
    let Some(ArmamentBehavior::Cannon {
        burst: Some(burst), ..
    }) = catalog.armament(projectile.def).map(|def| &def.behavior)
    else {
        return;
    };

    let targets = ctx.units_overlapping_circle(
        projectile.position,
        burst.radius,
        Affects::OpposingTo(projectile.team),
    );
    ctx.damage_all(&targets, burst.damage, projectile.parent);
    ctx.out.trigger(
        EffectId::PROJECTILE_BURST,
        Anchor::Absolute {
            position: projectile.position,
            heading: projectile.heading,
            speed: projectile.speed,
        },
        None,
    );
}

/// Advance every live missile one tick.
pub(crate) fn advance_missiles(ctx: &mut TickContext<'_>) {
    let catalog = ctx.catalog;
    for id in ctx.world.missiles.sorted_ids() {
        let Some(mut missile) = ctx.world.missiles.remove(id) else {
            continue;
        };
        let Some(def) = catalog.missile(missile.def) else {
            continue;
        };

        let target = if missile.target == 0 {
            None
        } else {
            ctx.world
                .units
                .get(missile.target)
                .filter(|unit| unit.is_operable())
                .map(|unit| (unit.position, unit.radius))
        };
        match target {
            Some((position, _)) => {
                let desired = missile.position.heading_to(position);
                missile.heading = rotate_toward(missile.heading, desired, def.turn_rate);
            }
            None => missile.target = 0,
        }

        missile.position += Vec2Fixed::from_angle(missile.heading, missile.speed);
        missile.frames_left = missile.frames_left.saturating_sub(1);

        let proximity = target.is_some_and(|(position, radius)| {
            circles_overlap(missile.position, missile.radius, position, radius)
        });
        if proximity || missile.frames_left == 0 {
            detonate_missile(ctx, &missile, def.blast_radius, def.effect, proximity);
        } else {
            ctx.world.missiles.insert(id, missile);
        }
    }
}

fn detonate_missile(
    ctx: &mut TickContext<'_>,
    missile: &Missile,
    blast_radius: Fixed,
    effect: MissileEffect,
    proximity: bool,
) {
    let affected = if blast_radius > Fixed::ZERO {
        ctx.units_overlapping_circle(missile.position, blast_radius, Affects::All)
    } else if proximity {
        vec![missile.target]
    } else {
        Vec::new()
    };

    for target in affected {
        match effect {
            MissileEffect::Damage { amount } => {
                ctx.damage_unit(target, amount, missile.parent);
            }
            MissileEffect::Disable { ticks } => ctx.disable_unit(target, ticks),
            MissileEffect::Impulse { strength } => {
                let Some(position) = ctx.world.units.get(target).map(|u| u.position) else {
                    continue;
                };
                let away = (position - missile.position).normalize();
                let direction = if away == Vec2Fixed::ZERO {
                    Vec2Fixed::from_angle(missile.heading, Fixed::ONE)
                } else {
                    away
                };
                ctx.push_unit(target, direction.scale(strength));
            }
        }
    }

    ctx.out.trigger(
        EffectId::MISSILE_DETONATION,
        Anchor::Absolute {
            position: missile.position,
            heading: missile.heading,
            speed: missile.speed,
        },
        None,
    );
}

/// Advance every live mine one tick.
///
/// A deploying mine only counts down; it neither triggers nor expires.
pub(crate) fn advance_mines(ctx: &mut TickContext<'_>) {
    let catalog = ctx.catalog;
    for id in ctx.world.mines.sorted_ids() {
        let Some(mut mine) = ctx.world.mines.remove(id) else {
            continue;
        };
        let Some(def) = catalog.mine(mine.def) else {
            continue;
        };

        if !mine.is_armed() {
            mine.deploying -= 1;
            if mine.is_armed() {
                ctx.out.mutated.mines.insert(id);
            }
            ctx.world.mines.insert(id, mine);
            continue;
        }

        mine.left = mine.left.saturating_sub(1);
        let triggered = !ctx
            .units_overlapping_circle(
                mine.position,
                def.trigger_radius,
                Affects::OpposingTo(mine.team),
            )
            .is_empty();
        if !triggered && mine.left > 0 {
            ctx.world.mines.insert(id, mine);
            continue;
        }

        let affected = ctx.units_overlapping_circle(mine.position, def.blast_radius, Affects::All);
        for target in affected {
            match def.effect {
                MineEffect::Damage { amount } => {
                    ctx.damage_unit(target, amount, mine.parent);
                }
                MineEffect::Disable { ticks } => ctx.disable_unit(target, ticks),
            }
        }
        ctx.out.mutated.mines.insert(id);
        ctx.out.trigger(
            EffectId::MINE_DETONATION,
            Anchor::at(mine.position, mine.heading),
            None,
        );
    }
}

/// Advance every collectable one tick: pickup first, then expiry.
pub(crate) fn advance_collectables(ctx: &mut TickContext<'_>) {
    let catalog = ctx.catalog;
    for id in ctx.world.collectables.sorted_ids() {
        let Some(mut collectable) = ctx.world.collectables.remove(id) else {
            continue;
        };
        let Some(def) = catalog.collectable(collectable.def) else {
            continue;
        };
        collectable.left = collectable.left.saturating_sub(1);

        let picker = ctx
            .world
            .units
            .iter_sorted()
            .find(|(_, unit)| {
                unit.is_operable()
                    && circles_overlap(collectable.position, def.radius, unit.position, unit.radius)
            })
            .map(|(unit_id, _)| unit_id);

        if let Some(unit_id) = picker {
            grant(ctx, unit_id, def.reward);
            ctx.out.trigger(
                EffectId::PICKUP,
                Anchor::Player(unit_id),
                Some(Anchor::at(collectable.position, Fixed::ZERO)),
            );
        } else if collectable.left > 0 {
            ctx.world.collectables.insert(id, collectable);
        }
    }
}

fn grant(ctx: &mut TickContext<'_>, unit_id: EntityId, reward: Reward) {
    let catalog = ctx.catalog;
    let Some(unit) = ctx.world.units.get_mut(unit_id) else {
        return;
    };
    let Some(unit_def) = catalog.unit(unit.def) else {
        return;
    };
    match reward {
        Reward::Energy { amount } => unit.gain_energy(amount, unit_def),
        Reward::Health { amount } => unit.heal(amount, unit_def),
        Reward::Ammo { rounds } => unit.restock(rounds, catalog),
        Reward::Cargo { amount } => {
            let taken = amount.min(unit.cargo_free(unit_def));
            unit.cargo += taken;
        }
    }
    ctx.out.mutated.units.insert(unit_id);
}

/// Run every delayed action whose countdown has elapsed.
pub(crate) fn drain_delayed(ctx: &mut TickContext<'_>) {
    for effect in ctx.world.delayed.drain_due() {
        match effect {
            DelayedEffect::Pulse {
                origin,
                heading,
                radius,
                damage,
                source,
                team,
            } => {
                let targets = ctx.units_overlapping_circle(origin, radius, Affects::OpposingTo(team));
                ctx.damage_all(&targets, damage, source);
                ctx.out.trigger(
                    EffectId::PULSE_DETONATION,
                    Anchor::at(origin, heading),
                    None,
                );
            }
        }
    }
}
