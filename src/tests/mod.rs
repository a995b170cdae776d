mod deliveries_list;
mod deliveries_race;
mod postgres;
