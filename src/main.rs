//! Sonance - Spatial sound and acoustic environment demo
//!
//! Walks a listener through a small level, classifying the space at each stop
//! while entities around it emit sounds. Runs either as a client that plays
//! the sounds, or as a server that only produces messages for clients.

mod scene;
mod settings;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sonance_audio::{
    AudioBackend, AudioService, ClientAudioService, EmitRequest, KiraBackend, MockBackend,
    ServerAudioService, ServiceRole, SoundContext,
};
use sonance_core::{EntityIndex, SimClock, SoundFlags, Soundlevel, SourceChannel};

use scene::{DemoScene, GUARD, PLAYER, RADIO};
use settings::Settings;

/// Frame time of the simulated walkthrough
const FRAME_TIME: f32 = 1.0 / 30.0;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Sonance...");

    let settings = Settings::load();
    let mut scene = DemoScene::build();

    match settings.run.role {
        ServiceRole::Client if settings.run.headless => {
            info!("Headless run, sounds are mixed silently");
            run_client(MockBackend::new(), &settings, &mut scene);
        }
        ServiceRole::Client => match KiraBackend::new(&settings.audio.asset_root) {
            Ok(backend) => run_client(backend, &settings, &mut scene),
            Err(e) => {
                warn!("No audio output ({e}), falling back to silent mixing");
                run_client(MockBackend::new(), &settings, &mut scene);
            }
        },
        ServiceRole::Server => run_server(&settings, &mut scene),
    }

    if settings.run.save_on_exit {
        settings.save().context("Failed to save settings")?;
    }

    info!("Sonance shut down");
    Ok(())
}

/// Visit every station, emitting a handful of sounds at each.
fn run_client<B: AudioBackend>(backend: B, settings: &Settings, scene: &mut DemoScene) {
    let mut service = ClientAudioService::new(backend, settings.audio.clone());
    let mut server = ServerAudioService::new(&settings.audio);
    let mut clock = SimClock::new(settings.time.clone());
    let stations = scene.stations.clone();

    for station in &stations {
        info!(station = station.name, "Entering station");
        scene.place(PLAYER, "player", station.listener - Vec3::Z * 64.0);
        scene.place(GUARD, "guard", station.listener + Vec3::new(150.0, 40.0, -64.0));
        scene.place(RADIO, "radio", station.listener + Vec3::new(-80.0, -60.0, -40.0));
        service.invalidate_environment();
        service.set_audio_state(station.listener, Vec3::ZERO);

        let radio = {
            let ctx = SoundContext::new(&scene.entities, &scene.world, clock.current_time)
                .with_local_player(PLAYER);
            service.emit(
                &ctx,
                EmitRequest::new(RADIO, SourceChannel::Static, "ambient/radio_chatter.wav")
                    .with_soundlevel(Soundlevel::STATIC)
                    .with_volume(0.6),
            )
        };

        for frame in 0..settings.run.frames_per_station {
            clock.update(FRAME_TIME);
            let yaw = frame as f32 * 360.0 / settings.run.frames_per_station.max(1) as f32;
            service.set_audio_state(station.listener, Vec3::new(0.0, yaw, 0.0));

            let ctx = SoundContext::new(&scene.entities, &scene.world, clock.current_time)
                .with_local_player(PLAYER);

            if frame % 10 == 0 {
                service.emit(
                    &ctx,
                    EmitRequest::new(
                        EntityIndex::LOCAL_PLAYER,
                        SourceChannel::Body,
                        format!("player/footsteps/concrete{}.wav", frame / 10 % 4 + 1),
                    )
                    .with_soundlevel(Soundlevel::IDLE),
                );
            }
            if frame % 4 == 0 {
                service.emit(
                    &ctx,
                    EmitRequest::new(GUARD, SourceChannel::Weapon, "weapons/smg/fire1.wav")
                        .with_soundlevel(Soundlevel::GUNFIRE)
                        .with_pitch(95 + (frame % 3) as i32 * 5),
                );
            }
            if frame == 5 {
                server.emit_sound(
                    &ctx,
                    EmitRequest::new(GUARD, SourceChannel::Voice, "npc/guard/alert.wav")
                        .with_soundlevel(Soundlevel::TALKING)
                        .at_time(clock.current_time + 0.25),
                );
                for message in server.drain_frames() {
                    debug!(%message, "Server sound message");
                    service.handle_frame(&ctx, &message);
                }
            }

            if let Some(space) = service.update(&ctx, clock.delta_time) {
                info!(
                    station = station.name,
                    room = %space.room_type,
                    reflectivity = space.reflectivity,
                    size = space.space_size,
                    sky = space.sky_visibility,
                    "Acoustic space"
                );
                if space.room_type != station.expected {
                    warn!(
                        station = station.name,
                        expected = %station.expected,
                        "Unexpected room type"
                    );
                }
            }
        }

        info!(
            station = station.name,
            channels = service.registry().len(),
            pending = service.pending_sounds(),
            "Leaving station"
        );

        if let Some(radio) = radio {
            service.set_volume_by_guid(radio, 0.2);
            if service.is_sound_still_playing(radio) {
                service.stop_sound_by_guid(radio);
            }
        }
        let ctx = SoundContext::new(&scene.entities, &scene.world, clock.current_time);
        service.stop_sound(&ctx, GUARD, SourceChannel::Weapon, "weapons/smg/fire1.wav");
    }

    if let Some(guid) = service.last_guid() {
        debug!(%guid, playing = service.is_sound_still_playing(guid), "Last sound");
    }
    service.on_disconnected();
}

/// Produce the sound messages a server would send for one pass of the level.
fn run_server(settings: &Settings, scene: &mut DemoScene) {
    let mut service = ServerAudioService::new(&settings.audio);
    let mut clock = SimClock::new(settings.time.clone());

    for station in scene.stations.clone() {
        scene.place(GUARD, "guard", station.listener + Vec3::new(150.0, 40.0, -64.0));
        clock.update(FRAME_TIME);
        let ctx = SoundContext::new(&scene.entities, &scene.world, clock.current_time);

        service.emit_sound(
            &ctx,
            EmitRequest::new(GUARD, SourceChannel::Weapon, "weapons/smg/fire1.wav")
                .with_soundlevel(Soundlevel::GUNFIRE),
        );
        service.emit_sound(
            &ctx,
            EmitRequest::new(GUARD, SourceChannel::Voice, "npc/guard/alert.wav")
                .with_soundlevel(Soundlevel::TALKING)
                .at_time(clock.current_time + 0.5),
        );
        service.stop_sound(&ctx, GUARD, SourceChannel::Weapon, "weapons/smg/fire1.wav");
        service.emit_sound(
            &ctx,
            EmitRequest::new(GUARD, SourceChannel::Voice, "npc/guard/alert.wav")
                .with_flags(SoundFlags::CHANGE_VOL)
                .with_volume(0.5),
        );

        for frame in service.drain_frames() {
            info!(station = station.name, %frame, "Sound message");
        }
    }

    let level = Soundlevel::GUNFIRE;
    for distance in [100.0, 1000.0, 10_000.0] {
        let gain = service.dist_gain_from_soundlevel(level, distance);
        debug!(soundlevel = level.0, distance, gain, "Gunfire falloff");
    }
}
