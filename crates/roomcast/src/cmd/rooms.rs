use roomcast_hub::{HubSettings, RoomDirectory, RoomInfo};
use serde::Serialize;

use crate::cmd::RoomsArgs;
use crate::exit::{hub_error, CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct RoomRow {
    #[serde(flatten)]
    info: RoomInfo,
    main: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    can_see: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    can_join: Option<bool>,
}

#[derive(Serialize)]
struct RoomsOutput {
    settings: String,
    main_room: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<String>,
    rooms: Vec<RoomRow>,
}

pub fn run(args: RoomsArgs, format: OutputFormat) -> CliResult<i32> {
    let settings = HubSettings::from_path(&args.settings)
        .map_err(|err| hub_error("failed to load settings", err))?;
    let directory = RoomDirectory::from_settings(&settings)
        .map_err(|err| hub_error("failed to create rooms", err))?;

    let identity = args.identity.as_deref();
    let rooms = directory
        .rooms()
        .iter()
        .map(|room| RoomRow {
            info: room.info(),
            main: room.name() == settings.main_room,
            can_see: identity.map(|id| room.can_see_identity(id)),
            can_join: identity.map(|id| room.can_join_identity(id)),
        })
        .collect();

    let out = RoomsOutput {
        settings: args.settings.display().to_string(),
        main_room: settings.main_room.clone(),
        identity: args.identity.clone(),
        rooms,
    };
    print_rooms(&out, format);
    Ok(SUCCESS)
}

fn print_rooms(out: &RoomsOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut header = vec!["ROOM", "VISIBLE", "LIST MODE", "LIST"];
            if out.identity.is_some() {
                header.extend(["CAN SEE", "CAN JOIN"]);
            }
            let mut t = table(header);
            for row in &out.rooms {
                let mut cells = vec![
                    room_label(row),
                    row.info.visible.to_string(),
                    list_mode(&row.info).to_string(),
                    row.info.list.join(", "),
                ];
                if let (Some(see), Some(join)) = (row.can_see, row.can_join) {
                    cells.push(see.to_string());
                    cells.push(join.to_string());
                }
                t.add_row(cells);
            }
            println!("{t}");
        }
        OutputFormat::Pretty => {
            for row in &out.rooms {
                let mut line = format!(
                    "{} visible={} {}=[{}]",
                    room_label(row),
                    row.info.visible,
                    list_mode(&row.info),
                    row.info.list.join(", ")
                );
                if let (Some(see), Some(join)) = (row.can_see, row.can_join) {
                    line.push_str(&format!(" can_see={see} can_join={join}"));
                }
                println!("{line}");
            }
        }
    }
}

fn room_label(row: &RoomRow) -> String {
    if row.main {
        format!("{} (main)", row.info.name)
    } else {
        row.info.name.clone()
    }
}

fn list_mode(info: &RoomInfo) -> &'static str {
    if info.use_as_whitelist {
        "whitelist"
    } else {
        "blacklist"
    }
}
